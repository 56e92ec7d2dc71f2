//! Wire types for the linkding bookmark API.
//!
//! Field names match the JSON the service produces and consumes; changing
//! them breaks compatibility with real servers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

fn id_is_unset(id: &i64) -> bool {
    *id == 0
}

/// A bookmark record as stored by the service.
///
/// `id` is assigned by the service and omitted from create payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    #[serde(default, skip_serializing_if = "id_is_unset")]
    pub id: i64,
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub tag_names: Vec<String>,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default)]
    pub unread: bool,
    #[serde(default)]
    pub shared: bool,
    #[serde(default, skip_serializing)]
    pub date_added: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing)]
    pub date_modified: Option<DateTime<Utc>>,
}

impl Bookmark {
    /// Creates an unsaved bookmark for `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            id: 0,
            url: url.into(),
            title: String::new(),
            description: String::new(),
            notes: String::new(),
            tag_names: Vec::new(),
            is_archived: false,
            unread: false,
            shared: false,
            date_added: None,
            date_modified: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tag_names = tags;
        self
    }
}

/// Partial update payload. Only present fields are changed by the service.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BookmarkPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_names: Option<Vec<String>>,
}

impl BookmarkPatch {
    /// True when the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.tag_names.is_none()
    }
}

/// One page of a list response.
///
/// `next` is an opaque URL; hand it back to `list` to continue, or stop
/// after the first page.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

/// Response of the existence probe. `bookmark` is null when the URL is not
/// bookmarked, which is an expected outcome rather than an error.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckResponse {
    pub bookmark: Option<Bookmark>,
}

/// An archived asset attached to a bookmark (snapshot, upload, ...).
#[derive(Debug, Clone, Deserialize)]
pub struct BookmarkAsset {
    pub id: i64,
    #[serde(default)]
    pub asset_type: String,
    #[serde(default)]
    pub content_type: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub status: String,
}
