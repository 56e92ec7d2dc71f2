//! Reconciliation of a single document against the remote service.
//!
//! Two facts drive the decision: does the document have a URL, and does it
//! carry a previously recorded remote identifier. Everything else follows
//! from what the service says about that identifier.

use std::collections::BTreeSet;
use std::path::PathBuf;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::document::Document;

use super::client::BookmarkClient;
use super::error::{ApiError, SyncError};
use super::protocol::{Bookmark, BookmarkPatch};

/// What happened to a document during reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    /// A new remote record was created (or would be, in dry-run)
    Created,
    /// The remote record exists and matches local state
    Verified,
    /// The remote record was patched with local values
    Updated,
    /// The document has no URL and was not touched
    Skipped,
    /// A remote call failed; see the outcome's error
    Error,
}

impl std::fmt::Display for SyncAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SyncAction::Created => "created",
            SyncAction::Verified => "verified",
            SyncAction::Updated => "updated",
            SyncAction::Skipped => "skipped",
            SyncAction::Error => "error",
        };
        write!(f, "{}", name)
    }
}

/// The result of reconciling one document. Immutable once produced.
#[derive(Debug)]
pub struct SyncOutcome {
    pub path: PathBuf,
    pub action: SyncAction,
    pub remote_id: Option<i64>,
    pub error: Option<SyncError>,
}

impl SyncOutcome {
    fn new(path: PathBuf, action: SyncAction, remote_id: Option<i64>) -> Self {
        Self {
            path,
            action,
            remote_id,
            error: None,
        }
    }

    fn error(path: PathBuf, error: SyncError) -> Self {
        Self {
            path,
            action: SyncAction::Error,
            remote_id: None,
            error: Some(error),
        }
    }

    /// True when the underlying failure was a cancellation.
    pub fn is_cancelled(&self) -> bool {
        self.error.as_ref().is_some_and(SyncError::is_cancelled)
    }
}

/// Options controlling reconciliation behavior.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Front-matter field holding the bookmark URL
    pub url_field: String,
    /// Front-matter field holding the title
    pub title_field: String,
    /// Front-matter field holding the tag list
    pub tags_field: String,
    /// Front-matter field holding the remote identifier
    pub id_field: String,
    /// Overwrite the remote title when it differs from the local one
    pub sync_title: bool,
    /// Overwrite the remote tags when they differ from the local ones
    pub sync_tags: bool,
    /// Probe for an existing bookmark before creating a new one
    pub check_before_create: bool,
    /// Probe before re-creating when a stored identifier turns out stale
    pub recheck_on_recreate: bool,
    /// Compute actions without mutating remote or local state
    pub dry_run: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            url_field: "url".to_string(),
            title_field: "title".to_string(),
            tags_field: "tags".to_string(),
            id_field: "linkding_id".to_string(),
            sync_title: true,
            sync_tags: true,
            check_before_create: false,
            recheck_on_recreate: true,
            dry_run: false,
        }
    }
}

/// Reconciles documents one at a time against the remote service.
pub struct Reconciler<'a> {
    client: &'a BookmarkClient,
    options: &'a SyncOptions,
}

impl<'a> Reconciler<'a> {
    pub fn new(client: &'a BookmarkClient, options: &'a SyncOptions) -> Self {
        Self { client, options }
    }

    /// Classifies and executes the action for one document.
    ///
    /// Never returns an error: every failure is captured in the outcome so
    /// the batch can keep going. On a successful create (or adoption of an
    /// existing record) the identifier is written into the document's
    /// front-matter; dry-run leaves the document untouched.
    pub async fn reconcile(
        &self,
        document: &mut Document,
        cancel: &CancellationToken,
    ) -> SyncOutcome {
        let path = document.path().to_path_buf();

        let Some(url) = document.field_str(&self.options.url_field) else {
            debug!(path = %path.display(), "no URL field, skipping");
            return SyncOutcome::new(path, SyncAction::Skipped, None);
        };

        let recorded = document.field_int(&self.options.id_field).unwrap_or(0);
        let result = if recorded > 0 {
            self.verify_existing(document, &url, recorded, cancel).await
        } else {
            self.create_new(document, &url, cancel).await
        };

        match result {
            Ok(outcome) => outcome,
            Err(e) => SyncOutcome::error(path, e),
        }
    }

    /// Create path: the document has never been synced.
    async fn create_new(
        &self,
        document: &mut Document,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<SyncOutcome, SyncError> {
        let path = document.path().to_path_buf();

        if self.options.check_before_create {
            if let Some(existing) = self.client.check_existing(url, cancel).await? {
                return Ok(self.adopt(document, existing.id));
            }
        }

        if self.options.dry_run {
            return Ok(SyncOutcome::new(path, SyncAction::Created, None));
        }

        let created = self
            .client
            .create(&self.desired_bookmark(document, url), cancel)
            .await?;
        document.set_field_int(&self.options.id_field, created.id);
        Ok(SyncOutcome::new(path, SyncAction::Created, Some(created.id)))
    }

    /// Verify path: the document carries a recorded identifier.
    async fn verify_existing(
        &self,
        document: &mut Document,
        url: &str,
        recorded: i64,
        cancel: &CancellationToken,
    ) -> Result<SyncOutcome, SyncError> {
        let path = document.path().to_path_buf();

        let remote = match self.client.get(recorded, cancel).await {
            Ok(remote) => remote,
            Err(SyncError::Api(ApiError::NotFound)) => {
                debug!(path = %path.display(), recorded, "stored identifier is stale");
                return self.recreate(document, url, cancel).await;
            }
            Err(e) => return Err(e),
        };

        let patch = self.pending_changes(document, &remote);
        if patch.is_empty() {
            return Ok(SyncOutcome::new(path, SyncAction::Verified, Some(recorded)));
        }
        if self.options.dry_run {
            return Ok(SyncOutcome::new(path, SyncAction::Updated, Some(recorded)));
        }

        let updated = self.client.update(recorded, &patch, cancel).await?;
        Ok(SyncOutcome::new(path, SyncAction::Updated, Some(updated.id)))
    }

    /// Re-create path: the stored identifier no longer resolves.
    async fn recreate(
        &self,
        document: &mut Document,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<SyncOutcome, SyncError> {
        let path = document.path().to_path_buf();

        if self.options.recheck_on_recreate {
            if let Some(existing) = self.client.check_existing(url, cancel).await? {
                return Ok(self.adopt(document, existing.id));
            }
        }

        if self.options.dry_run {
            return Ok(SyncOutcome::new(path, SyncAction::Created, None));
        }

        let created = self
            .client
            .create(&self.desired_bookmark(document, url), cancel)
            .await?;
        document.set_field_int(&self.options.id_field, created.id);
        Ok(SyncOutcome::new(path, SyncAction::Created, Some(created.id)))
    }

    /// Adopts an identifier found by the existence probe.
    fn adopt(&self, document: &mut Document, id: i64) -> SyncOutcome {
        if !self.options.dry_run {
            document.set_field_int(&self.options.id_field, id);
        }
        SyncOutcome::new(document.path().to_path_buf(), SyncAction::Verified, Some(id))
    }

    /// Builds the record a create call should store.
    fn desired_bookmark(&self, document: &Document, url: &str) -> Bookmark {
        let mut bookmark = Bookmark::new(url);
        if let Some(title) = document.field_str(&self.options.title_field) {
            bookmark = bookmark.with_title(title);
        }
        bookmark.with_tags(document.field_list(&self.options.tags_field))
    }

    /// Computes the partial update needed to bring the remote record in
    /// line with local values, honoring the per-field sync flags.
    fn pending_changes(&self, document: &Document, remote: &Bookmark) -> BookmarkPatch {
        let mut patch = BookmarkPatch::default();

        if self.options.sync_title {
            if let Some(title) = document.field_str(&self.options.title_field) {
                if title != remote.title {
                    patch.title = Some(title);
                }
            }
        }

        if self.options.sync_tags {
            let tags = document.field_list(&self.options.tags_field);
            if !tag_sets_match(&tags, &remote.tag_names) {
                patch.tag_names = Some(tags);
            }
        }

        patch
    }
}

/// Compares tag collections as sets: order-insensitive,
/// duplicate-collapsing, case-sensitive.
fn tag_sets_match(local: &[String], remote: &[String]) -> bool {
    let local: BTreeSet<&str> = local.iter().map(String::as_str).collect();
    let remote: BTreeSet<&str> = remote.iter().map(String::as_str).collect();
    local == remote
}

/// Documents that can be synced at all: those carrying a URL.
pub fn eligible<'a>(documents: &'a [Document], options: &SyncOptions) -> Vec<&'a Document> {
    documents
        .iter()
        .filter(|doc| doc.field_str(&options.url_field).is_some())
        .collect()
}

/// Eligible documents with no positive recorded identifier.
pub fn unsynced<'a>(documents: &'a [Document], options: &SyncOptions) -> Vec<&'a Document> {
    documents
        .iter()
        .filter(|doc| {
            doc.field_str(&options.url_field).is_some()
                && doc.field_int(&options.id_field).unwrap_or(0) <= 0
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(front_matter: &str) -> Document {
        Document::parse("note.md", &format!("---\n{}\n---\nbody\n", front_matter)).unwrap()
    }

    #[test]
    fn test_tag_sets_order_insensitive() {
        let a = vec!["rust".to_string(), "web".to_string()];
        let b = vec!["web".to_string(), "rust".to_string()];
        assert!(tag_sets_match(&a, &b));
    }

    #[test]
    fn test_tag_sets_duplicates_collapse() {
        let a = vec!["rust".to_string(), "rust".to_string()];
        let b = vec!["rust".to_string()];
        assert!(tag_sets_match(&a, &b));
    }

    #[test]
    fn test_tag_sets_case_sensitive() {
        let a = vec!["Rust".to_string()];
        let b = vec!["rust".to_string()];
        assert!(!tag_sets_match(&a, &b));
    }

    #[test]
    fn test_eligible_requires_url() {
        let documents = vec![
            doc("url: https://x.test\ntitle: A"),
            doc("title: No link here"),
        ];
        let options = SyncOptions::default();
        let found = eligible(&documents, &options);
        assert_eq!(found.len(), 1);
        assert_eq!(
            found[0].field_str("title").as_deref(),
            Some("A")
        );
    }

    #[test]
    fn test_unsynced_excludes_positive_identifiers() {
        let documents = vec![
            doc("url: https://a.test\nlinkding_id: 3"),
            doc("url: https://b.test"),
            doc("url: https://c.test\nlinkding_id: 0"),
            doc("title: no url\nlinkding_id: 9"),
        ];
        let options = SyncOptions::default();
        let found = unsynced(&documents, &options);
        let urls: Vec<_> = found
            .iter()
            .filter_map(|d| d.field_str("url"))
            .collect();
        assert_eq!(urls, vec!["https://b.test", "https://c.test"]);
    }

    #[test]
    fn test_custom_field_names() {
        let documents = vec![doc("link: https://x.test")];
        let options = SyncOptions {
            url_field: "link".to_string(),
            ..SyncOptions::default()
        };
        assert_eq!(eligible(&documents, &options).len(), 1);
        assert_eq!(eligible(&documents, &SyncOptions::default()).len(), 0);
    }
}
