// src/extractors/orphans.rs

use std::collections::{HashMap, HashSet};

use ego_tree::NodeId;

use crate::filing::SectionMap;
use crate::markup::TagTree;
use crate::tables::{NotedTable, RawTable, TableFilter, TableOrigin};

/// Counters from one orphan pass, for logging.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrphanReport {
    pub sections_located: usize,
    pub tables_seen: usize,
    pub tables_as_headings: usize,
    pub tables_unlocated: usize,
    pub tables_before_first_section: usize,
    pub tables_rejected: usize,
    pub tables_deduplicated: usize,
    pub tables_attached: usize,
}

/// Attaches every document table to the nearest preceding section by
/// offset in the document's visible text.
///
/// `headings` pairs each section's heading node with its key, in scan order.
/// Offsets come from node positions, not string search, so a table of
/// contents repeating the heading lines cannot pull a boundary forward.
/// Additive to the note scan: unless `dedupe` is set, tables that scan
/// already captured are appended a second time.
pub fn reconcile_orphans(
    tree: &TagTree,
    headings: &[(NodeId, String)],
    sections: &mut SectionMap,
    filter: &dyn TableFilter,
    dedupe: bool,
) -> OrphanReport {
    let mut report = OrphanReport::default();

    let tables = tree.tables();
    let anchors: Vec<NodeId> = headings
        .iter()
        .map(|(id, _)| *id)
        .chain(tables.iter().copied())
        .collect();
    let offsets = tree.text_offsets("\n", &anchors);
    let (heading_offsets, table_offsets) = offsets.split_at(headings.len());

    // 1. Section boundaries, sorted by offset.
    let mut boundaries: Vec<(usize, &str)> = headings
        .iter()
        .zip(heading_offsets)
        .filter_map(|((_, key), offset)| offset.map(|offset| (offset, key.as_str())))
        .collect();
    boundaries.sort_by_key(|(offset, _)| *offset);
    report.sections_located = boundaries.len();

    let heading_ids: HashSet<NodeId> = headings.iter().map(|(id, _)| *id).collect();

    // Copies already held per section, consumed one per matching orphan.
    let mut existing: HashMap<String, HashMap<RawTable, usize>> = HashMap::new();
    if dedupe {
        for section in sections.iter() {
            let counts = existing.entry(section.key.clone()).or_default();
            for table in &section.tables {
                *counts.entry(table.table.clone()).or_default() += 1;
            }
        }
    }

    // 2. Tables, in document order.
    for (&table_id, offset) in tables.iter().zip(table_offsets) {
        report.tables_seen += 1;
        if heading_ids.contains(&table_id) {
            report.tables_as_headings += 1;
            continue;
        }
        let Some(offset) = *offset else {
            report.tables_unlocated += 1;
            continue;
        };

        let preceding = boundaries.partition_point(|(start, _)| *start < offset);
        let Some(&(_, key)) = preceding.checked_sub(1).map(|i| &boundaries[i]) else {
            report.tables_before_first_section += 1;
            continue;
        };

        let table = RawTable::from_node(tree, table_id);
        if !filter.accepts(&table) {
            report.tables_rejected += 1;
            continue;
        }

        if dedupe {
            if let Some(count) = existing.get_mut(key).and_then(|c| c.get_mut(&table)) {
                if *count > 0 {
                    *count -= 1;
                    report.tables_deduplicated += 1;
                    continue;
                }
            }
        }

        if let Some(section) = sections.get_mut(key) {
            tracing::trace!("Orphan table at offset {} attached to '{}'", offset, key);
            section.tables.push(NotedTable {
                note_number: None,
                table,
                markup: tree.outer_markup(table_id),
                origin: TableOrigin::Orphan,
            });
            report.tables_attached += 1;
        }
    }

    report
}
