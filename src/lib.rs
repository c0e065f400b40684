//! Product listing extraction for shopping results pages
//!
//! Turns a rendered results page into product records and keeps them in an
//! append-only store that can be exported:
//! - Listing scanner with per-field fallback chains (identifier, title,
//!   image, price, rating and review count)
//! - JSON-file accumulation store with a persisted export session
//! - CSV and JSON export with session-derived file names
//! - Paged preview state and display helpers

pub mod config;
pub mod error;
pub mod export;
pub mod extractors;
pub mod preview;
pub mod record;
pub mod scanner;
pub mod session;
pub mod store;

pub use config::{load_config, CollectorConfig};
pub use error::{ConfigError, ExportError, ExtractError, StoreError};
pub use export::{export_from_store, ExportArtifact, ExportFormat, Exporter};
pub use extractors::{extract_field, Field, Listing, Strategy};
pub use preview::PreviewState;
pub use record::ProductRecord;
pub use scanner::{normalize_url, ListingScanner};
pub use session::ExportSession;
pub use store::{JsonFileStore, MemoryStore, RecordStore};
