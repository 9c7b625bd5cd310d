// src/storage/mod.rs
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::filing::{Payload, SectionMap};
use crate::utils::error::StorageError;

/// Writes parsed filings as JSON for the indexing collaborator.
pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager, creating the base directory if needed.
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(StorageError::IoError)?;
        }
        Ok(Self { base_dir: base_path })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Output file stem for a source file, e.g. `aapl-20230930`.
    pub fn stem_for(source: &Path) -> String {
        source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "filing".to_string())
    }

    /// Directory for debug artifacts, created on demand.
    pub fn debug_dir(&self) -> Result<PathBuf, StorageError> {
        let dir = self.base_dir.join("debug");
        fs::create_dir_all(&dir).map_err(StorageError::IoError)?;
        Ok(dir)
    }

    /// Saves the whole section map as one JSON object keyed by heading.
    pub fn save_sections(&self, stem: &str, sections: &SectionMap) -> Result<PathBuf, StorageError> {
        let file_path = self.base_dir.join(format!("{}_sections.json", stem));
        let json = serde_json::to_string_pretty(sections)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;
        fs::write(&file_path, json).map_err(StorageError::IoError)?;

        tracing::info!("Saved {} sections to {}", sections.len(), file_path.display());
        Ok(file_path)
    }

    /// Saves payloads as JSON Lines, one record per line.
    pub fn save_payloads(&self, stem: &str, payloads: &[Payload]) -> Result<PathBuf, StorageError> {
        let file_path = self.base_dir.join(format!("{}_payloads.jsonl", stem));
        let file = fs::File::create(&file_path).map_err(StorageError::IoError)?;
        let mut writer = BufWriter::new(file);

        for payload in payloads {
            serde_json::to_writer(&mut writer, payload)
                .map_err(|e| StorageError::SerializationError(e.to_string()))?;
            writer.write_all(b"\n").map_err(StorageError::IoError)?;
        }
        writer.flush().map_err(StorageError::IoError)?;

        tracing::info!("Saved {} payloads to {}", payloads.len(), file_path.display());
        Ok(file_path)
    }

    /// Saves a summary of the parse in JSON format.
    pub fn save_metadata(
        &self,
        stem: &str,
        source_path: &str,
        sections: &SectionMap,
    ) -> Result<PathBuf, StorageError> {
        let file_path = self.base_dir.join(format!("{}_meta.json", stem));
        let document = sections.iter().next().map(|s| &s.metadata);

        let metadata = serde_json::json!({
            "source_path": source_path,
            "form_type": document.and_then(|m| m.form_type),
            "filing_date": document.and_then(|m| m.filing_date.clone()),
            "cik": document.and_then(|m| m.cik.clone()),
            "section_count": sections.len(),
            "table_count": sections.table_count(),
            "sections": sections.keys().collect::<Vec<_>>(),
            "extraction_timestamp": chrono::Utc::now().to_rfc3339(),
        });

        let metadata_str = serde_json::to_string_pretty(&metadata)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;
        fs::write(&file_path, metadata_str).map_err(StorageError::IoError)?;

        tracing::info!("Saved metadata to {}", file_path.display());
        Ok(file_path)
    }

    /// Sections, payloads and summary for one parsed source file.
    pub fn save_all(&self, source: &Path, sections: &SectionMap) -> Result<Vec<PathBuf>, StorageError> {
        let stem = Self::stem_for(source);
        Ok(vec![
            self.save_sections(&stem, sections)?,
            self.save_payloads(&stem, &sections.payloads())?,
            self.save_metadata(&stem, &source.display().to_string(), sections)?,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::FilingParser;
    use tempfile::tempdir;

    #[test]
    fn test_stem_for() {
        assert_eq!(StorageManager::stem_for(Path::new("/tmp/aapl-20230930.htm")), "aapl-20230930");
        assert_eq!(StorageManager::stem_for(Path::new("/")), "filing");
    }

    #[test]
    fn test_save_all_writes_three_files() {
        let dir = tempdir().unwrap();
        let storage = StorageManager::new(dir.path().join("out")).unwrap();
        let sections = FilingParser::new().parse_str(
            "<p>Form 10-Q</p><p>Item 2. MD&amp;A</p><table><tr><td>Revenue</td><td>5</td></tr></table>",
            "q.htm",
        );

        let paths = storage.save_all(Path::new("q.htm"), &sections).unwrap();
        assert_eq!(paths.len(), 3);

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&paths[0]).unwrap()).unwrap();
        assert_eq!(json["Item 2. MD&A"]["form_type"], "10-Q");

        let lines: Vec<serde_json::Value> = fs::read_to_string(&paths[1])
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 1 + sections.table_count());
        assert_eq!(lines[0]["metadata"]["type"], "narrative");
        assert_eq!(lines[1]["metadata"]["type"], "table");

        let meta: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&paths[2]).unwrap()).unwrap();
        assert_eq!(meta["section_count"], 1);
        assert_eq!(meta["form_type"], "10-Q");
        assert!(meta["extraction_timestamp"].is_string());
    }

    #[test]
    fn test_debug_dir_is_created_under_base() {
        let dir = tempdir().unwrap();
        let storage = StorageManager::new(dir.path()).unwrap();
        let debug = storage.debug_dir().unwrap();
        assert!(debug.is_dir());
        assert_eq!(debug, dir.path().join("debug"));
    }
}
