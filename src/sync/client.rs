//! HTTP client for a linkding-compatible bookmark service.
//!
//! Each operation is a thin composition: build a request template, run it
//! through the resilient executor, decode the response. Status codes are
//! translated uniformly into the typed error taxonomy; nothing at this
//! layer retries a response the service actually produced.

use std::path::Path;
use std::sync::Arc;

use reqwest::Method;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::SyncConfig;

use super::error::{ApiError, SyncError};
use super::executor::RequestExecutor;
use super::limiter::RateLimiter;
use super::protocol::{Bookmark, BookmarkAsset, BookmarkPatch, CheckResponse, Page};
use super::transport::{RequestTemplate, Transport, TransportConfig};

/// Client for the bookmark service REST API.
pub struct BookmarkClient {
    base_url: String,
    token: String,
    executor: RequestExecutor,
}

impl BookmarkClient {
    /// Creates a client with an explicit executor.
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        executor: RequestExecutor,
    ) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            token: token.into(),
            executor,
        }
    }

    /// Creates a client from config with default transport and rate limits.
    ///
    /// Returns `NotConfigured` if the server URL or API token is missing.
    pub fn from_config(config: &SyncConfig) -> Result<Self, SyncError> {
        let server_url = config.server_url.clone().ok_or(SyncError::NotConfigured)?;
        let api_token = config.api_token.clone().ok_or(SyncError::NotConfigured)?;

        let transport = Transport::new(&TransportConfig::default())?;
        let limiter = Arc::new(RateLimiter::default_limits());
        Ok(Self::new(
            server_url,
            api_token,
            RequestExecutor::new(transport, limiter),
        ))
    }

    /// Returns the configured server URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Creates a new bookmark. The returned record carries the
    /// service-assigned identifier.
    pub async fn create(
        &self,
        bookmark: &Bookmark,
        cancel: &CancellationToken,
    ) -> Result<Bookmark, SyncError> {
        debug!(url = %bookmark.url, "creating bookmark");
        let template = self
            .template(Method::POST, self.bookmarks_url(""))
            .with_json(bookmark)?;
        let response = self.executor.execute(&template, cancel).await?;
        match response.status().as_u16() {
            201 => decode(response).await,
            _ => Err(translate_status(response).await),
        }
    }

    /// Fetches a bookmark by identifier.
    ///
    /// A stale identifier surfaces as `ApiError::NotFound`, which callers
    /// must treat as an expected outcome distinct from other failures.
    pub async fn get(&self, id: i64, cancel: &CancellationToken) -> Result<Bookmark, SyncError> {
        let template = self.template(Method::GET, self.bookmarks_url(&format!("{}/", id)));
        let response = self.executor.execute(&template, cancel).await?;
        match response.status().as_u16() {
            200 => decode(response).await,
            _ => Err(translate_status(response).await),
        }
    }

    /// Fetches one page of bookmarks.
    ///
    /// Pass the previous page's `next` URL to continue; `None` starts from
    /// the beginning. Callers may stop after the first page.
    pub async fn list(
        &self,
        page_url: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<Page<Bookmark>, SyncError> {
        let url = match page_url {
            Some(next) => next.to_string(),
            None => self.bookmarks_url(""),
        };
        let template = self.template(Method::GET, url);
        let response = self.executor.execute(&template, cancel).await?;
        match response.status().as_u16() {
            200 => decode(response).await,
            _ => Err(translate_status(response).await),
        }
    }

    /// Applies a partial update; only fields present in `patch` change.
    pub async fn update(
        &self,
        id: i64,
        patch: &BookmarkPatch,
        cancel: &CancellationToken,
    ) -> Result<Bookmark, SyncError> {
        debug!(id, "updating bookmark");
        let template = self
            .template(Method::PATCH, self.bookmarks_url(&format!("{}/", id)))
            .with_json(patch)?;
        let response = self.executor.execute(&template, cancel).await?;
        match response.status().as_u16() {
            200 => decode(response).await,
            _ => Err(translate_status(response).await),
        }
    }

    /// Deletes a bookmark.
    pub async fn delete(&self, id: i64, cancel: &CancellationToken) -> Result<(), SyncError> {
        let template = self.template(Method::DELETE, self.bookmarks_url(&format!("{}/", id)));
        let response = self.executor.execute(&template, cancel).await?;
        match response.status().as_u16() {
            200 | 204 => Ok(()),
            _ => Err(translate_status(response).await),
        }
    }

    /// Probes whether `url` is already bookmarked.
    ///
    /// Returns `Ok(None)` when the URL has no bookmark, which is the common
    /// case and not an error.
    pub async fn check_existing(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<Bookmark>, SyncError> {
        let probe_url = format!(
            "{}check/?url={}",
            self.bookmarks_url(""),
            urlencoding::encode(url)
        );
        let template = self.template(Method::GET, probe_url);
        let response = self.executor.execute(&template, cancel).await?;
        match response.status().as_u16() {
            200 => {
                let check: CheckResponse = decode(response).await?;
                Ok(check.bookmark)
            }
            _ => Err(translate_status(response).await),
        }
    }

    /// Lists archived assets attached to a bookmark.
    pub async fn list_assets(
        &self,
        id: i64,
        cancel: &CancellationToken,
    ) -> Result<Page<BookmarkAsset>, SyncError> {
        let template = self.template(Method::GET, self.bookmarks_url(&format!("{}/assets/", id)));
        let response = self.executor.execute(&template, cancel).await?;
        match response.status().as_u16() {
            200 => decode(response).await,
            _ => Err(translate_status(response).await),
        }
    }

    /// Downloads one asset to `destination`.
    pub async fn download_asset(
        &self,
        id: i64,
        asset_id: i64,
        destination: &Path,
        cancel: &CancellationToken,
    ) -> Result<(), SyncError> {
        let template = self.template(
            Method::GET,
            self.bookmarks_url(&format!("{}/assets/{}/download/", id, asset_id)),
        );
        let response = self.executor.execute(&template, cancel).await?;
        if response.status().as_u16() != 200 {
            return Err(translate_status(response).await);
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| SyncError::Decode(e.to_string()))?;
        tokio::fs::write(destination, &bytes).await?;
        debug!(id, asset_id, path = %destination.display(), "asset downloaded");
        Ok(())
    }

    fn bookmarks_url(&self, suffix: &str) -> String {
        format!("{}/api/bookmarks/{}", self.base_url, suffix)
    }

    fn template(&self, method: Method, url: String) -> RequestTemplate {
        RequestTemplate::new(method, url)
            .with_header("Authorization", format!("Token {}", self.token))
            .with_header("Accept", "application/json")
    }
}

/// Decodes a success response body.
async fn decode<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, SyncError> {
    response
        .json()
        .await
        .map_err(|e| SyncError::Decode(e.to_string()))
}

/// Maps a non-success response onto the closed error taxonomy. The mapping
/// is the same for every operation; what 404 means is up to the caller.
async fn translate_status(response: reqwest::Response) -> SyncError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let error = match status {
        400 => ApiError::Validation(body),
        401 => ApiError::Auth,
        403 => ApiError::Forbidden,
        404 => ApiError::NotFound,
        429 => ApiError::RateLimited,
        500 => ApiError::Server(body),
        other => ApiError::Unexpected(other, body),
    };
    SyncError::Api(error)
}
