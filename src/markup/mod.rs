// src/markup/mod.rs
//! Tolerant markup tree used by every scanning pass.
//!
//! Wraps `scraper::Html` (html5ever into an `ego_tree` arena) and adds the
//! operations the segmenter needs: visible text with separators only at
//! block boundaries, ordered "unit" scans over an allow-list of tags,
//! subtree serialization, and node excision by id.

pub mod decode;

use std::collections::{HashMap, HashSet};

use ego_tree::{NodeId, NodeRef};
use scraper::{ElementRef, Html, Node};

pub use decode::{decode_bytes, DecodedText};

/// Elements whose start and end break visible text into separate segments.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "br", "caption", "center", "dd",
    "div", "dl", "dt", "fieldset", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5",
    "h6", "header", "hr", "html", "li", "main", "nav", "ol", "p", "pre", "section", "table",
    "tbody", "td", "tfoot", "th", "thead", "tr", "ul",
];

/// Block elements that turn an allow-listed ancestor into a container to
/// descend through instead of a single unit. `br`/`hr` only break lines.
const CONTAINER_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "center", "div", "dl", "fieldset", "figure",
    "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "li", "main", "nav", "ol",
    "p", "pre", "section", "table", "ul",
];

/// Content of these elements is never visible text.
const INVISIBLE_TAGS: &[&str] = &["head", "noscript", "script", "style", "template", "title"];

/// Document scaffolding that scans always descend through.
const SCAFFOLD_TAGS: &[&str] = &["html", "body"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    /// An allow-listed element with no block-level descendants.
    Element,
    /// A table, always taken whole.
    Table,
    /// A loose, non-blank text run directly inside a container or the body.
    Text,
}

/// One buffered item produced by [`TagTree::units`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unit {
    pub id: NodeId,
    pub kind: UnitKind,
}

/// An owned, mutable markup tree.
pub struct TagTree {
    html: Html,
}

impl TagTree {
    pub fn parse_document(text: &str) -> Self {
        Self {
            html: Html::parse_document(text),
        }
    }

    /// Parses markup that is not a full document, e.g. a buffered section.
    pub fn parse_fragment(markup: &str) -> Self {
        Self {
            html: Html::parse_fragment(markup),
        }
    }

    pub fn root(&self) -> NodeRef<'_, Node> {
        self.html.tree.root()
    }

    pub fn node(&self, id: NodeId) -> Option<NodeRef<'_, Node>> {
        self.html.tree.get(id)
    }

    /// Visible text of the whole tree.
    pub fn visible_text(&self, separator: &str) -> String {
        visible_text(self.root(), separator)
    }

    /// Byte offsets into `visible_text(separator)` at which each anchor's
    /// text begins. `None` for unknown or invisible nodes.
    pub fn text_offsets(&self, separator: &str, anchors: &[NodeId]) -> Vec<Option<usize>> {
        let mut sink = TextSink {
            watched: anchors.iter().copied().collect(),
            ..TextSink::default()
        };
        sink.walk(self.root());
        sink.boundary();

        let mut starts = Vec::with_capacity(sink.segments.len());
        let mut pos = 0;
        for (i, segment) in sink.segments.iter().enumerate() {
            if i > 0 {
                pos += separator.len();
            }
            starts.push(pos);
            pos += segment.len();
        }

        anchors
            .iter()
            .map(|id| {
                sink.marks
                    .get(id)
                    .map(|&segment| starts.get(segment).copied().unwrap_or(pos))
            })
            .collect()
    }

    /// Text runs of a subtree joined by single spaces, the way heading
    /// candidates are read: `<b>Item 7.</b>Management` gives
    /// `Item 7. Management`.
    pub fn flat_text(&self, id: NodeId) -> String {
        let mut runs = Vec::new();
        if let Some(node) = self.node(id) {
            collect_runs(node, &mut runs);
        }
        normalize_whitespace(&runs.join(" "))
    }

    /// Visible text of one subtree; empty if the id is unknown.
    pub fn node_text(&self, id: NodeId, separator: &str) -> String {
        self.node(id)
            .map(|node| visible_text(node, separator))
            .unwrap_or_default()
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.node(id)
            .and_then(|node| node.value().as_element())
            .map(|el| el.name())
    }

    /// Serializes a subtree back to markup. Text nodes are escaped.
    pub fn outer_markup(&self, id: NodeId) -> String {
        let Some(node) = self.node(id) else {
            return String::new();
        };
        match node.value() {
            Node::Text(text) => html_escape::encode_text(&**text).into_owned(),
            Node::Element(_) => ElementRef::wrap(node).map(|el| el.html()).unwrap_or_default(),
            _ => String::new(),
        }
    }

    /// Ordered scan of the units below the root for the given allow-list.
    ///
    /// Allow-listed elements without block descendants are units; those with
    /// block descendants are descended into. Tables are atomic units.
    /// Elements outside the allow-list are passed through: their allow-listed
    /// descendants are still scanned, but their own loose text and direct
    /// tables are not units.
    pub fn units(&self, allow_list: &[&str]) -> Vec<Unit> {
        let mut units = Vec::new();
        collect_units(self.root(), allow_list, false, &mut units);
        units
    }

    /// Outermost tables of the whole tree, in document order.
    pub fn tables(&self) -> Vec<NodeId> {
        let mut tables = Vec::new();
        collect_tables(self.root(), &mut tables);
        tables
    }

    /// Outermost tables within a subtree, including the node itself.
    pub fn tables_within(&self, id: NodeId) -> Vec<NodeId> {
        let mut tables = Vec::new();
        if let Some(node) = self.node(id) {
            collect_tables(node, &mut tables);
        }
        tables
    }

    /// Detaches a node (and its subtree) from the tree.
    pub fn excise(&mut self, id: NodeId) -> bool {
        match self.html.tree.get_mut(id) {
            Some(mut node) => {
                node.detach();
                true
            }
            None => false,
        }
    }
}

fn element_name<'a>(node: &NodeRef<'a, Node>) -> Option<&'a str> {
    node.value().as_element().map(|el| el.name())
}

fn is_container(node: NodeRef<'_, Node>) -> bool {
    node.descendants()
        .skip(1)
        .any(|d| element_name(&d).is_some_and(|name| CONTAINER_TAGS.contains(&name)))
}

fn collect_units(
    node: NodeRef<'_, Node>,
    allow_list: &[&str],
    pass_through: bool,
    units: &mut Vec<Unit>,
) {
    for child in node.children() {
        match child.value() {
            Node::Text(text) => {
                if !pass_through && !text.trim().is_empty() {
                    units.push(Unit { id: child.id(), kind: UnitKind::Text });
                }
            }
            Node::Element(el) => {
                let name = el.name();
                if name == "table" {
                    if pass_through {
                        tracing::trace!("Table inside a passed-through element left for the orphan pass");
                    } else {
                        units.push(Unit { id: child.id(), kind: UnitKind::Table });
                    }
                } else if SCAFFOLD_TAGS.contains(&name) {
                    collect_units(child, allow_list, false, units);
                } else if allow_list.contains(&name) {
                    if is_container(child) {
                        collect_units(child, allow_list, false, units);
                    } else {
                        units.push(Unit { id: child.id(), kind: UnitKind::Element });
                    }
                } else if !INVISIBLE_TAGS.contains(&name) {
                    collect_units(child, allow_list, true, units);
                }
            }
            _ => {}
        }
    }
}

fn collect_runs<'a>(node: NodeRef<'a, Node>, runs: &mut Vec<&'a str>) {
    match node.value() {
        Node::Text(text) => runs.push(&**text),
        Node::Element(el) if INVISIBLE_TAGS.contains(&el.name()) => {}
        _ => {
            for child in node.children() {
                collect_runs(child, runs);
            }
        }
    }
}

fn collect_tables(node: NodeRef<'_, Node>, tables: &mut Vec<NodeId>) {
    if element_name(&node) == Some("table") {
        tables.push(node.id());
        return;
    }
    for child in node.children() {
        collect_tables(child, tables);
    }
}

/// Visible text of a subtree.
///
/// Inline runs are concatenated as-is; the separator is inserted only between
/// block-level segments. Each segment has its whitespace collapsed (NBSP
/// included) and blank segments are dropped, so the text of a block subtree
/// is always a substring of the text of any tree containing it.
pub fn visible_text(node: NodeRef<'_, Node>, separator: &str) -> String {
    let mut sink = TextSink::default();
    sink.walk(node);
    sink.finish(separator)
}

#[derive(Default)]
struct TextSink {
    current: String,
    segments: Vec<String>,
    watched: HashSet<NodeId>,
    /// Watched node -> index of the segment its text starts in.
    marks: HashMap<NodeId, usize>,
}

impl TextSink {
    fn walk(&mut self, node: NodeRef<'_, Node>) {
        match node.value() {
            Node::Text(text) => self.current.push_str(text),
            Node::Element(el) => {
                let name = el.name();
                if INVISIBLE_TAGS.contains(&name) {
                    return;
                }
                let block = BLOCK_TAGS.contains(&name);
                if block {
                    self.boundary();
                }
                if self.watched.contains(&node.id()) {
                    self.marks.insert(node.id(), self.segments.len());
                }
                for child in node.children() {
                    self.walk(child);
                }
                if block {
                    self.boundary();
                }
            }
            Node::Document | Node::Fragment => {
                for child in node.children() {
                    self.walk(child);
                }
            }
            _ => {}
        }
    }

    fn boundary(&mut self) {
        let segment = normalize_whitespace(&self.current);
        if !segment.is_empty() {
            self.segments.push(segment);
        }
        self.current.clear();
    }

    fn finish(mut self, separator: &str) -> String {
        self.boundary();
        self.segments.join(separator)
    }
}

/// Collapses every whitespace run (including NBSP) to one space and trims.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
