// src/extractors/mod.rs
pub mod metadata;
pub mod notes;
pub mod orphans;
pub mod section;

// Re-export key extraction types for convenience
pub use metadata::extract_metadata;
pub use notes::{extract_section_content, note_number, SectionContent, NOTE_TAGS};
pub use orphans::{reconcile_orphans, OrphanReport};
pub use section::{heading_key, segment, SectionBuffer, SectionSegmenter, SECTION_TAGS};
