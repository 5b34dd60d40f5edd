//! Collaborator seams for the confirmation workflow
//!
//! The workflow core is pure data in / data out; everything with I/O
//! behind it (catalogue search, detail fetch, duplicate check, append)
//! sits behind these traits so that lifetime and failure handling are
//! visible at the call sites and the workflow is testable with in-memory
//! fakes.

use thiserror::Error;

use crate::models::{Candidate, ReleaseDetail};

/// Release catalogue errors
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Release not found: {0}")]
    NotFound(u64),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Collection store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// External release catalogue (search + lazy detail fetch).
///
/// `search` is best-effort text search and may legitimately return fewer
/// than `limit` or zero results. `fetch_detail` resolves one release's
/// full metadata and fails if the id is invalid or the remote service is
/// unavailable.
#[async_trait::async_trait]
pub trait ReleaseCatalog: Send + Sync {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Candidate>, CatalogError>;

    async fn fetch_detail(&self, id: u64) -> Result<ReleaseDetail, CatalogError>;
}

/// Persisted CD collection (duplicate check + append-only writes).
///
/// Duplicate matching policy: catalogue id first, then case-insensitive
/// exact match on the (title, artist) pair.
#[async_trait::async_trait]
pub trait CollectionStore: Send + Sync {
    async fn is_duplicate(&self, detail: &ReleaseDetail) -> Result<bool, StoreError>;

    async fn append(&self, detail: &ReleaseDetail) -> Result<(), StoreError>;
}
