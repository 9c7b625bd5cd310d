// src/tables/mod.rs
//! Table rows/cells, their footnote context and rendering.

pub mod filter;
pub mod markdown;

use ego_tree::NodeId;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Selector};
use serde::Serialize;

use crate::markup::{visible_text, TagTree};

pub use filter::{AcceptAll, FinancialKeywords, TableFilter};
pub use markdown::{to_markdown, EMPTY_TABLE_SENTINEL};

static ROW_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("tr").expect("Failed to compile ROW_SELECTOR"));

static CELL_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td, th").expect("Failed to compile CELL_SELECTOR"));

/// A possibly ragged matrix of whitespace-normalized cell strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct RawTable {
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    /// Reads the rows of a `<table>` node. Rows of nested tables are left to
    /// the nested table itself.
    pub fn from_node(tree: &TagTree, table_id: NodeId) -> Self {
        let Some(table) = tree.node(table_id).and_then(ElementRef::wrap) else {
            return Self::default();
        };

        let rows = table
            .select(&ROW_SELECTOR)
            .filter(|row| owning_table(*row) == Some(table_id))
            .map(|row| {
                row.select(&CELL_SELECTOR)
                    .filter(|cell| cell.parent().map(|p| p.id()) == Some(row.id()))
                    .map(|cell| visible_text(*cell, " "))
                    .collect()
            })
            .collect();

        Self { rows }
    }

    pub fn is_blank(&self) -> bool {
        self.rows
            .iter()
            .all(|row| row.iter().all(|cell| cell.trim().is_empty()))
    }

    pub fn to_markdown(&self) -> String {
        to_markdown(&self.rows)
    }
}

fn owning_table(row: ElementRef<'_>) -> Option<NodeId> {
    row.ancestors()
        .find(|node| node.value().as_element().is_some_and(|el| el.name() == "table"))
        .map(|node| node.id())
}

/// Which pass attached a table to its section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableOrigin {
    NoteScan,
    Orphan,
}

/// A table with the footnote it was found under and its original markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotedTable {
    pub note_number: Option<u32>,
    #[serde(flatten)]
    pub table: RawTable,
    pub markup: String,
    pub origin: TableOrigin,
}

impl NotedTable {
    pub fn to_markdown(&self) -> String {
        self.table.to_markdown()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_table(tree: &TagTree) -> NodeId {
        tree.tables()[0]
    }

    #[test]
    fn test_rows_and_cells_are_normalized() {
        let tree = TagTree::parse_fragment(
            "<table><tr><th>Total&nbsp;&nbsp;<b>assets</b></th><td>\n 1,024 </td></tr>\
             <tr><td></td><td>$ 12</td><td>extra</td></tr></table>",
        );
        let table = RawTable::from_node(&tree, first_table(&tree));
        assert_eq!(
            table.rows,
            vec![
                vec!["Total assets".to_string(), "1,024".to_string()],
                vec!["".to_string(), "$ 12".to_string(), "extra".to_string()],
            ]
        );
        assert!(!table.is_blank());
    }

    #[test]
    fn test_nested_table_rows_stay_with_inner_table() {
        let tree = TagTree::parse_fragment(
            "<table><tr><td>outer<table><tr><td>inner</td></tr></table></td></tr></table>",
        );
        let table = RawTable::from_node(&tree, first_table(&tree));
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0], vec!["outer inner".to_string()]);
    }

    #[test]
    fn test_blank_table() {
        let tree = TagTree::parse_fragment("<table><tr><td> </td><td>&nbsp;</td></tr></table>");
        let table = RawTable::from_node(&tree, first_table(&tree));
        assert!(table.is_blank());
        assert_eq!(table.to_markdown(), EMPTY_TABLE_SENTINEL);
    }
}
