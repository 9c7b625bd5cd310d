// src/filing/records.rs
//! Payload records handed to the indexing collaborator.

use serde::Serialize;

use super::models::{FormType, Section, SectionMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadKind {
    Narrative,
    Table,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayloadMetadata {
    pub section: String,
    pub form_type: Option<FormType>,
    pub filing_date: Option<String>,
    pub cik: Option<String>,
    pub filename: String,
    #[serde(rename = "type")]
    pub kind: PayloadKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footnote: Option<u32>,
}

/// A text payload plus the metadata the index stores alongside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Payload {
    pub text: String,
    pub metadata: PayloadMetadata,
}

impl Section {
    /// One narrative payload followed by one markdown payload per table.
    pub fn payloads(&self) -> Vec<Payload> {
        let base = PayloadMetadata {
            section: self.key.clone(),
            form_type: self.metadata.form_type,
            filing_date: self.metadata.filing_date.clone(),
            cik: self.metadata.cik.clone(),
            filename: self.source_path.clone(),
            kind: PayloadKind::Narrative,
            footnote: None,
        };

        let tables = self.tables.iter().map(|table| Payload {
            text: table.to_markdown(),
            metadata: PayloadMetadata {
                kind: PayloadKind::Table,
                footnote: table.note_number,
                ..base.clone()
            },
        });

        std::iter::once(Payload {
            text: self.narrative_text.clone(),
            metadata: base.clone(),
        })
        .chain(tables)
        .collect()
    }
}

impl SectionMap {
    /// Payloads of every section, in section order.
    pub fn payloads(&self) -> Vec<Payload> {
        self.iter().flat_map(Section::payloads).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filing::models::DocumentMetadata;
    use crate::tables::{NotedTable, RawTable, TableOrigin};

    fn sample_section() -> Section {
        Section {
            key: "Item 8. Financial Statements".to_string(),
            metadata: DocumentMetadata {
                form_type: Some(FormType::TenK),
                filing_date: Some("20231103".to_string()),
                cik: Some("320193".to_string()),
            },
            source_path: "aapl-20230930.htm".to_string(),
            raw_markup: String::new(),
            narrative_text: "Item 8. Financial Statements".to_string(),
            tables: vec![
                NotedTable {
                    note_number: Some(3),
                    table: RawTable::new(vec![vec!["Cash".into(), "29,965".into()]]),
                    markup: String::new(),
                    origin: TableOrigin::NoteScan,
                },
                NotedTable {
                    note_number: None,
                    table: RawTable::default(),
                    markup: String::new(),
                    origin: TableOrigin::Orphan,
                },
            ],
        }
    }

    #[test]
    fn test_section_payloads() {
        let payloads = sample_section().payloads();
        assert_eq!(payloads.len(), 3);

        assert_eq!(payloads[0].metadata.kind, PayloadKind::Narrative);
        assert_eq!(payloads[0].text, "Item 8. Financial Statements");
        assert_eq!(payloads[0].metadata.footnote, None);

        assert_eq!(payloads[1].metadata.kind, PayloadKind::Table);
        assert_eq!(payloads[1].metadata.footnote, Some(3));
        assert_eq!(payloads[1].text, "| Cash | 29,965 |\n| --- | --- |\n");
        assert_eq!(payloads[1].metadata.section, "Item 8. Financial Statements");

        assert_eq!(payloads[2].text, crate::tables::EMPTY_TABLE_SENTINEL);
    }

    #[test]
    fn test_payload_json_shape() {
        let payloads = sample_section().payloads();
        let narrative = serde_json::to_value(&payloads[0]).unwrap();
        assert_eq!(narrative["metadata"]["type"], "narrative");
        assert_eq!(narrative["metadata"]["form_type"], "10-K");
        assert!(narrative["metadata"].get("footnote").is_none());

        let table = serde_json::to_value(&payloads[1]).unwrap();
        assert_eq!(table["metadata"]["type"], "table");
        assert_eq!(table["metadata"]["footnote"], 3);
        assert_eq!(table["metadata"]["filename"], "aapl-20230930.htm");
    }
}
