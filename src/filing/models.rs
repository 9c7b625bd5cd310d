// src/filing/models.rs

use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDate;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde::Deserialize;

use crate::tables::NotedTable;

/// Periodic report forms the metadata pass recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, Deserialize)]
pub enum FormType {
    #[serde(rename = "10-K")]
    TenK,
    #[serde(rename = "10-Q")]
    TenQ,
}

impl FormType {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.to_ascii_uppercase().as_str() {
            "10-K" => Some(Self::TenK),
            "10-Q" => Some(Self::TenQ),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TenK => "10-K",
            Self::TenQ => "10-Q",
        }
    }
}

impl fmt::Display for FormType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Document-level metadata, parsed once per filing.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub form_type: Option<FormType>,
    /// `YYYYMMDD`, as written in the filing header.
    pub filing_date: Option<String>,
    pub cik: Option<String>,
}

impl DocumentMetadata {
    pub fn filing_date_parsed(&self) -> Option<NaiveDate> {
        self.filing_date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y%m%d").ok())
    }
}

/// One "Item N" section of a filing.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Section {
    /// Whitespace-normalized heading line; also the map key.
    pub key: String,
    #[serde(flatten)]
    pub metadata: DocumentMetadata,
    pub source_path: String,
    pub raw_markup: String,
    /// Plain text with every table excised.
    pub narrative_text: String,
    pub tables: Vec<NotedTable>,
}

/// Sections keyed by heading, in first-insertion order.
///
/// Inserting an existing key replaces that section in place, so a repeated
/// heading keeps its original position but the last occurrence's content.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionMap {
    sections: Vec<Section>,
    index: HashMap<String, usize>,
}

impl SectionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a section, returning the one it replaced, if any.
    pub fn insert(&mut self, section: Section) -> Option<Section> {
        match self.index.get(&section.key) {
            Some(&pos) => Some(std::mem::replace(&mut self.sections[pos], section)),
            None => {
                self.index.insert(section.key.clone(), self.sections.len());
                self.sections.push(section);
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Section> {
        self.index.get(key).map(|&pos| &self.sections[pos])
    }

    pub(crate) fn get_mut(&mut self, key: &str) -> Option<&mut Section> {
        self.index.get(key).map(|&pos| &mut self.sections[pos])
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|s| s.key.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Section> {
        self.sections.iter()
    }

    pub fn table_count(&self) -> usize {
        self.sections.iter().map(|s| s.tables.len()).sum()
    }
}

impl IntoIterator for SectionMap {
    type Item = Section;
    type IntoIter = std::vec::IntoIter<Section>;

    fn into_iter(self) -> Self::IntoIter {
        self.sections.into_iter()
    }
}

impl<'a> IntoIterator for &'a SectionMap {
    type Item = &'a Section;
    type IntoIter = std::slice::Iter<'a, Section>;

    fn into_iter(self) -> Self::IntoIter {
        self.sections.iter()
    }
}

impl Serialize for SectionMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.sections.len()))?;
        for section in &self.sections {
            map.serialize_entry(&section.key, section)?;
        }
        map.end()
    }
}
