// src/lib.rs
//! Splits SEC 10-K / 10-Q HTML filings into "Item" sections, attributes
//! each table to its "Note N" footnote, and renders tables as markdown
//! payloads for a downstream index.

pub mod batch;
pub mod config;
pub mod engine;
pub mod extractors;
pub mod filing;
pub mod markup;
pub mod storage;
pub mod tables;
pub mod utils;

pub use config::{FilterMode, ParserConfig};
pub use engine::FilingParser;
pub use filing::{DocumentMetadata, FormType, Payload, PayloadKind, PayloadMetadata, Section, SectionMap};
pub use storage::StorageManager;
pub use tables::{AcceptAll, FinancialKeywords, NotedTable, RawTable, TableFilter, TableOrigin};
pub use utils::AppError;
