// src/extractors/section.rs

// --- Imports ---
use ego_tree::NodeId;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::markup::{normalize_whitespace, TagTree, Unit, UnitKind};

// --- Allow-list ---
// Tag kinds likely to carry "Item N" heading text. Generated filings often
// set the heading in a table row, so tables are candidates too.
pub const SECTION_TAGS: &[&str] = &[
    "div", "p", "span", "table", "font", "b", "strong", "h1", "h2", "h3", "h4", "h5", "h6",
];

// --- Heading pattern ---
// "Item", whitespace (NBSP included), item number with optional letter,
// optional punctuation, rest of the line.
static ITEM_HEADING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^Item\s+\d+[A-Z]?\s*[.\-:–—]?\s*.*$")
        .expect("Failed to compile ITEM_HEADING_RE")
});

/// Returns the section key for an element's text if it reads as an
/// "Item N" heading. The key is the whole normalized line, not the number.
pub fn heading_key(text: &str) -> Option<String> {
    let normalized = normalize_whitespace(text);
    ITEM_HEADING_RE.is_match(&normalized).then_some(normalized)
}

/// Markup buffered for one section, ready for the note/table pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionBuffer {
    pub key: String,
    /// The heading node in the scanned document.
    pub heading: NodeId,
    pub raw_markup: String,
}

/// Section-level accumulator: buffers units under the current heading and
/// flushes whenever a new heading starts and once at the end.
#[derive(Debug, Default)]
pub struct SectionSegmenter {
    current: Option<(String, NodeId)>,
    buffer: Vec<String>,
    flushed: Vec<SectionBuffer>,
    dropped_units: usize,
}

impl SectionSegmenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one unit of the document scan.
    pub fn push(&mut self, tree: &TagTree, unit: Unit) {
        let markup = tree.outer_markup(unit.id);

        let key = match unit.kind {
            UnitKind::Element | UnitKind::Table => heading_key(&tree.flat_text(unit.id)),
            UnitKind::Text => None,
        };

        match key {
            Some(key) => {
                tracing::trace!("Heading matched: '{}'", key);
                self.flush();
                self.current = Some((key, unit.id));
                self.buffer = vec![markup];
            }
            None => self.buffer.push(markup),
        }
    }

    fn flush(&mut self) {
        let buffered = std::mem::take(&mut self.buffer);
        match &self.current {
            Some((key, heading)) if !buffered.is_empty() => {
                tracing::debug!("Flushing section '{}' ({} units)", key, buffered.len());
                self.flushed.push(SectionBuffer {
                    key: key.clone(),
                    heading: *heading,
                    raw_markup: buffered.concat(),
                });
            }
            Some(_) => {}
            None => self.dropped_units += buffered.len(),
        }
    }

    /// Final flush; returns the sections in document order.
    pub fn finish(mut self) -> Vec<SectionBuffer> {
        self.flush();
        if self.dropped_units > 0 {
            tracing::debug!(
                "{} units preceded the first heading and belong to no section",
                self.dropped_units
            );
        }
        self.flushed
    }
}

/// Runs the section scan over a whole document.
pub fn segment(tree: &TagTree) -> Vec<SectionBuffer> {
    let mut segmenter = SectionSegmenter::new();
    for unit in tree.units(SECTION_TAGS) {
        segmenter.push(tree, unit);
    }
    segmenter.finish()
}
