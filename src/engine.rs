// src/engine.rs
//! End-to-end parse of one filing: decode, segment, note scan, orphans.

use std::path::Path;

use crate::config::ParserConfig;
use crate::extractors::{extract_metadata, extract_section_content, reconcile_orphans, segment};
use crate::filing::{Section, SectionMap};
use crate::markup::{decode_bytes, TagTree};
use crate::tables::TableFilter;
use crate::utils::error::AppError;

/// Splits filings into "Item" sections with footnote-scoped tables.
///
/// Holds no per-document state, so one parser can serve many threads.
pub struct FilingParser {
    filter: Box<dyn TableFilter>,
    dedupe_orphan_tables: bool,
}

impl Default for FilingParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FilingParser {
    /// Accept-all table filter, orphan duplicates kept.
    pub fn new() -> Self {
        Self::from_config(&ParserConfig::default())
    }

    pub fn from_config(config: &ParserConfig) -> Self {
        Self {
            filter: config.build_filter(),
            dedupe_orphan_tables: config.dedupe_orphan_tables,
        }
    }

    /// Replaces the table inclusion predicate.
    pub fn with_filter<F: TableFilter + 'static>(mut self, filter: F) -> Self {
        self.filter = Box::new(filter);
        self
    }

    pub fn with_dedupe_orphan_tables(mut self, dedupe: bool) -> Self {
        self.dedupe_orphan_tables = dedupe;
        self
    }

    pub fn parse_file(&self, path: &Path) -> Result<SectionMap, AppError> {
        let bytes = std::fs::read(path)?;
        Ok(self.parse_bytes(&bytes, &path.display().to_string()))
    }

    /// Decodes with best-effort charset detection, then parses.
    pub fn parse_bytes(&self, bytes: &[u8], source_path: &str) -> SectionMap {
        let decoded = decode_bytes(bytes);
        if decoded.had_errors {
            tracing::warn!("{} decoded with replacement characters", source_path);
        }
        self.parse_str(&decoded.text, source_path)
    }

    pub fn parse_str(&self, html: &str, source_path: &str) -> SectionMap {
        let tree = TagTree::parse_document(html);
        let full_text = tree.visible_text("\n");
        let metadata = extract_metadata(&full_text);

        let buffers = segment(&tree);
        let headings: Vec<_> = buffers
            .iter()
            .map(|buffer| (buffer.heading, buffer.key.clone()))
            .collect();

        let mut sections = SectionMap::new();
        for buffer in buffers {
            let content = extract_section_content(&buffer.raw_markup, self.filter.as_ref());
            let section = Section {
                key: buffer.key,
                metadata: metadata.clone(),
                source_path: source_path.to_string(),
                raw_markup: buffer.raw_markup,
                narrative_text: content.narrative_text,
                tables: content.tables,
            };
            if let Some(replaced) = sections.insert(section) {
                tracing::debug!("Repeated heading '{}': later section replaces earlier", replaced.key);
            }
        }

        if sections.is_empty() {
            tracing::warn!("No 'Item' headings found in {}; no sections extracted", source_path);
            return sections;
        }

        let report = reconcile_orphans(
            &tree,
            &headings,
            &mut sections,
            self.filter.as_ref(),
            self.dedupe_orphan_tables,
        );
        tracing::debug!("Orphan pass for {}: {:?}", source_path, report);

        tracing::info!(
            "Parsed {}: {} sections, {} tables",
            source_path,
            sections.len(),
            sections.table_count()
        );
        sections
    }
}
