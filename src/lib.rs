//! Home Library
//!
//! A book catalog kept as a single semicolon-delimited file on a WebDAV share,
//! fed by hand or by photographing bookshelves.

pub mod assistant;
pub mod blob_store;
pub mod catalog;
pub mod cli;
pub mod cli_style;
pub mod config;
pub mod llm;
pub mod service;
pub mod transcription;

// Re-export commonly used types for convenience
pub use blob_store::{BlobStore, MemoryBlobStore, StoreError, WebDavBlobStore};
pub use catalog::{BookRow, Catalog, CatalogSchema, MergeReport};
pub use service::{CatalogOrigin, CatalogService, LoadedCatalog, ShelfScanner};
pub use transcription::{parse_transcription, TranscriptionResult};
