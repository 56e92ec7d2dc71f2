//! Synchronization engine for the bookmark service.
//!
//! Layered bottom-up: `transport` executes single HTTP attempts, `limiter`
//! paces them, `executor` adds retry with backoff, `client` exposes typed
//! API operations, `engine` decides per-document actions, and `batch`
//! drives the whole collection.

mod batch;
mod client;
mod engine;
mod error;
mod executor;
mod limiter;
mod protocol;
mod transport;

pub use batch::{sync_documents, BatchCounts, BatchResult, ProgressCallback};
pub use client::BookmarkClient;
pub use engine::{eligible, unsynced, Reconciler, SyncAction, SyncOptions, SyncOutcome};
pub use error::{ApiError, SyncError, TransportError};
pub use executor::RequestExecutor;
pub use limiter::RateLimiter;
pub use protocol::{Bookmark, BookmarkAsset, BookmarkPatch, CheckResponse, Page};
pub use transport::{RequestTemplate, Transport, TransportConfig};
