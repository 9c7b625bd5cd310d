// src/tables/markdown.rs

/// Rendered in place of a table that has no non-blank rows.
pub const EMPTY_TABLE_SENTINEL: &str = "⚠️ Table is empty or malformed.";

const PLACEHOLDER: &str = " ";

/// Renders a ragged cell matrix as a markdown table.
///
/// Fully blank rows are dropped, blank cells become a single-space
/// placeholder and short rows are right-padded to the widest row. The first
/// surviving row is the header. Values are never interpreted.
pub fn to_markdown<S: AsRef<str>>(rows: &[Vec<S>]) -> String {
    let kept: Vec<&Vec<S>> = rows
        .iter()
        .filter(|row| row.iter().any(|cell| !cell.as_ref().trim().is_empty()))
        .collect();

    let Some(max_cols) = kept.iter().map(|row| row.len()).max() else {
        return EMPTY_TABLE_SENTINEL.to_string();
    };

    let normalized: Vec<Vec<&str>> = kept
        .iter()
        .map(|row| {
            let mut cells: Vec<&str> = row
                .iter()
                .map(|cell| match cell.as_ref().trim() {
                    "" => PLACEHOLDER,
                    trimmed => trimmed,
                })
                .collect();
            cells.resize(max_cols, PLACEHOLDER);
            cells
        })
        .collect();

    let mut md = String::new();
    push_row(&mut md, &normalized[0]);
    push_row(&mut md, &vec!["---"; max_cols]);
    for row in &normalized[1..] {
        push_row(&mut md, row);
    }
    md
}

fn push_row(md: &mut String, cells: &[&str]) {
    md.push_str("| ");
    md.push_str(&cells.join(" | "));
    md.push_str(" |\n");
}
