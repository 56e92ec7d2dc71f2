//! Markding core library
//!
//! Markding keeps markdown documents and a linkding-compatible bookmark
//! service in step. Each document carries its bookmark URL, title, and
//! tags in YAML front-matter; after a sync the service-assigned identifier
//! is stored there too, so later runs verify instead of re-creating.
//!
//! # Modules
//!
//! - `config`: Application configuration
//! - `document`: Markdown documents and their front-matter fields
//! - `scanner`: Document discovery on disk
//! - `sync`: Reconciliation engine and bookmark service client
//! - `commands`: CLI command implementations

pub mod commands;
pub mod config;
pub mod document;
pub mod scanner;
pub mod sync;

pub use config::{Config, ConfigError, SyncConfig};
pub use document::{Document, DocumentError};
pub use scanner::scan_documents;
pub use sync::{
    sync_documents, BatchResult, Bookmark, BookmarkClient, SyncAction, SyncError, SyncOptions,
    SyncOutcome,
};
