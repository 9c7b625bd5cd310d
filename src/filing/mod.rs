// src/filing/mod.rs
pub mod models;
pub mod records;

pub use models::{DocumentMetadata, FormType, Section, SectionMap};
pub use records::{Payload, PayloadKind, PayloadMetadata};
