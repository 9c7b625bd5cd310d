// src/extractors/notes.rs

use ego_tree::NodeId;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::markup::{TagTree, Unit, UnitKind};
use crate::tables::{NotedTable, RawTable, TableFilter, TableOrigin};

// Narrower allow-list for footnote headings. Tables are always scanned as
// whole units regardless.
pub const NOTE_TAGS: &[&str] = &["p", "div", "span", "b", "strong"];

static NOTE_HEADING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^Note\s+(\d+)").expect("Failed to compile NOTE_HEADING_RE")
});

/// The footnote number if the text starts with "Note N".
pub fn note_number(text: &str) -> Option<u32> {
    NOTE_HEADING_RE
        .captures(text.trim_start())
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Narrative and tables of one section after the note pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionContent {
    pub narrative_text: String,
    pub tables: Vec<NotedTable>,
}

/// Note-level accumulator, same shape as the section segmenter but keyed by
/// footnote number. Flushing a block extracts and excises its tables.
struct NoteAccumulator<'f> {
    filter: &'f dyn TableFilter,
    current_note: Option<u32>,
    buffer: Vec<NodeId>,
    tables: Vec<NotedTable>,
}

impl<'f> NoteAccumulator<'f> {
    fn new(filter: &'f dyn TableFilter) -> Self {
        Self {
            filter,
            current_note: None,
            buffer: Vec::new(),
            tables: Vec::new(),
        }
    }

    fn push(&mut self, tree: &mut TagTree, unit: Unit) {
        let note = match unit.kind {
            UnitKind::Element => note_number(&tree.flat_text(unit.id)),
            UnitKind::Table | UnitKind::Text => None,
        };

        match note {
            Some(number) => {
                self.flush(tree);
                tracing::trace!("Note {} starts", number);
                self.current_note = Some(number);
                self.buffer = vec![unit.id];
            }
            None => self.buffer.push(unit.id),
        }
    }

    fn flush(&mut self, tree: &mut TagTree) {
        for unit_id in std::mem::take(&mut self.buffer) {
            for table_id in tree.tables_within(unit_id) {
                let table = RawTable::from_node(tree, table_id);
                if self.filter.accepts(&table) {
                    self.tables.push(NotedTable {
                        note_number: self.current_note,
                        table,
                        markup: tree.outer_markup(table_id),
                        origin: TableOrigin::NoteScan,
                    });
                } else {
                    tracing::trace!("Table rejected by '{}' filter", self.filter.name());
                }
                tree.excise(table_id);
            }
        }
    }

    fn finish(mut self, tree: &mut TagTree) -> Vec<NotedTable> {
        self.flush(tree);
        self.tables
    }
}

/// Re-parses a section's buffered markup, attributes its tables to
/// footnotes and returns the table-free narrative.
pub fn extract_section_content(raw_markup: &str, filter: &dyn TableFilter) -> SectionContent {
    let mut tree = TagTree::parse_fragment(raw_markup);

    let mut notes = NoteAccumulator::new(filter);
    for unit in tree.units(NOTE_TAGS) {
        notes.push(&mut tree, unit);
    }
    let tables = notes.finish(&mut tree);

    // Tables the note scan never reached still stay out of the narrative.
    for table_id in tree.tables() {
        tree.excise(table_id);
    }

    SectionContent {
        narrative_text: tree.visible_text("\n").trim().to_string(),
        tables,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::{AcceptAll, FinancialKeywords};

    #[test]
    fn test_note_number() {
        assert_eq!(note_number("Note 3 — Leases"), Some(3));
        assert_eq!(note_number("NOTE 12. INCOME TAXES"), Some(12));
        assert_eq!(note_number("  note 7"), Some(7));
        assert_eq!(note_number("Notes to Consolidated Financial Statements"), None);
        assert_eq!(note_number("See Note 4"), None);
        assert_eq!(note_number("Note 99999999999999999999"), None);
    }

    #[test]
    fn test_tables_attributed_to_notes() {
        let markup = r#"<p>Item 8. Financial Statements</p>
            <table><tr><td>Revenue</td><td>100</td></tr></table>
            <p><b>Note 3 – Leases</b></p>
            <p>Lease cost was:</p>
            <table><tr><td>Operating lease cost</td><td>5</td></tr></table>
            <div>Note 4 Debt</div>
            <table><tr><td>Term loan</td><td>20</td></tr></table>"#;

        let content = extract_section_content(markup, &AcceptAll);
        let notes: Vec<Option<u32>> = content.tables.iter().map(|t| t.note_number).collect();
        assert_eq!(notes, vec![None, Some(3), Some(4)]);
        assert_eq!(content.tables[1].table.rows[0][0], "Operating lease cost");
        assert!(content.tables[1].markup.starts_with("<table>"));
        assert!(content.tables.iter().all(|t| t.origin == TableOrigin::NoteScan));

        assert_eq!(
            content.narrative_text,
            "Item 8. Financial Statements\nNote 3 – Leases\nLease cost was:\nNote 4 Debt"
        );
    }

    #[test]
    fn test_rejected_tables_are_still_excised() {
        let markup = r#"<p>Item 10. Directors</p>
            <table><tr><td>Name</td><td>Age</td></tr></table>
            <table><tr><td>Total liabilities</td><td>9</td></tr></table>"#;

        let content = extract_section_content(markup, &FinancialKeywords::default());
        assert_eq!(content.tables.len(), 1);
        assert_eq!(content.tables[0].table.rows[0][0], "Total liabilities");
        assert_eq!(content.narrative_text, "Item 10. Directors");
    }

    #[test]
    fn test_note_heading_inside_font() {
        let markup = r#"<p>Note 2 Revenue</p>
            <table><tr><td>iPhone</td><td>200</td></tr></table>
            <font><b>Note 3 Leases</b></font>
            <table><tr><td>Lease cost</td><td>5</td></tr></table>"#;

        let content = extract_section_content(markup, &AcceptAll);
        let notes: Vec<Option<u32>> = content.tables.iter().map(|t| t.note_number).collect();
        assert_eq!(notes, vec![Some(2), Some(3)]);
        assert_eq!(content.tables[1].table.rows[0], vec!["Lease cost", "5"]);
        assert!(content.narrative_text.ends_with("Note 3 Leases"));
    }

    #[test]
    fn test_tables_nested_in_note_units() {
        let markup = r#"<p>Note 2 Revenue</p>
            <div><span>Disaggregated revenue</span><table><tr><td>iPhone</td></tr></table></div>"#;

        let content = extract_section_content(markup, &AcceptAll);
        assert_eq!(content.tables.len(), 1);
        assert_eq!(content.tables[0].note_number, Some(2));
        assert!(!content.narrative_text.contains("iPhone"));
    }
}
