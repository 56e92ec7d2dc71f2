//! Batch orchestration over a document collection.
//!
//! Drives the reconciler over every document in input order, isolating
//! failures so a single document's error never aborts the run. Outcomes
//! come back as a 1:1, order-preserving mapping of the input.

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::document::Document;

use super::client::BookmarkClient;
use super::engine::{Reconciler, SyncAction, SyncOutcome, SyncOptions};

/// Observer invoked synchronously after each document completes.
pub type ProgressCallback = dyn Fn(&SyncOutcome) + Send + Sync;

/// Everything a batch run produced.
#[derive(Debug)]
pub struct BatchResult {
    /// One outcome per processed document, in input order
    pub outcomes: Vec<SyncOutcome>,
    /// True when the run stopped early because of cancellation
    pub cancelled: bool,
}

impl BatchResult {
    /// Tallies outcomes by action.
    pub fn counts(&self) -> BatchCounts {
        let mut counts = BatchCounts::default();
        for outcome in &self.outcomes {
            match outcome.action {
                SyncAction::Created => counts.created += 1,
                SyncAction::Verified => counts.verified += 1,
                SyncAction::Updated => counts.updated += 1,
                SyncAction::Skipped => counts.skipped += 1,
                SyncAction::Error => counts.errors += 1,
            }
        }
        counts
    }
}

/// Per-action outcome tallies for a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchCounts {
    pub created: usize,
    pub verified: usize,
    pub updated: usize,
    pub skipped: usize,
    pub errors: usize,
}

/// Reconciles every document against the remote service.
///
/// Documents are processed sequentially; the shared rate limiter already
/// paces remote calls, so extra concurrency buys nothing here. `progress`
/// is invoked once per completed document, before the next one starts.
/// Once `cancel` fires, no further documents are processed and the
/// outcomes accumulated so far are returned with `cancelled` set.
pub async fn sync_documents(
    client: &BookmarkClient,
    documents: &mut [Document],
    options: &SyncOptions,
    progress: Option<&ProgressCallback>,
    cancel: &CancellationToken,
) -> BatchResult {
    let reconciler = Reconciler::new(client, options);
    let mut outcomes = Vec::with_capacity(documents.len());

    for document in documents.iter_mut() {
        if cancel.is_cancelled() {
            info!(processed = outcomes.len(), "batch cancelled");
            return BatchResult {
                outcomes,
                cancelled: true,
            };
        }

        let outcome = reconciler.reconcile(document, cancel).await;
        if outcome.is_cancelled() {
            // The cancellation surfaced mid-reconcile; it is not a
            // document error, so the outcome is dropped.
            info!(processed = outcomes.len(), "batch cancelled");
            return BatchResult {
                outcomes,
                cancelled: true,
            };
        }

        if let Some(callback) = progress {
            callback(&outcome);
        }
        outcomes.push(outcome);
    }

    let errors = outcomes
        .iter()
        .filter(|o| o.action == SyncAction::Error)
        .count();
    info!(documents = outcomes.len(), errors, "batch complete");
    BatchResult {
        outcomes,
        cancelled: false,
    }
}
