//! cd-catalog library interface
//!
//! Catalogues physical CDs: searches the Discogs release database, ranks
//! candidates against a free-text query, and appends the chosen release
//! to a persisted collection after a resumable, ticket-based human
//! confirmation step.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod types;
pub mod workflow;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::services::ReleaseRanker;
use crate::types::{CollectionStore, ReleaseCatalog};
use crate::workflow::{AdditionWorkflow, WorkflowSettings};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool (collection reads)
    pub db: SqlitePool,
    /// External release catalogue (direct search/detail endpoints)
    pub catalog: Arc<dyn ReleaseCatalog>,
    /// Candidate ranker for direct search
    pub ranker: ReleaseRanker,
    /// The confirmation workflow and its ticket table
    pub workflow: Arc<AdditionWorkflow>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        catalog: Arc<dyn ReleaseCatalog>,
        store: Arc<dyn CollectionStore>,
        settings: WorkflowSettings,
    ) -> Self {
        let workflow = Arc::new(AdditionWorkflow::new(catalog.clone(), store, settings));
        Self {
            db,
            catalog,
            ranker: ReleaseRanker::new(),
            workflow,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::collection_routes())
        .merge(api::release_routes())
        .merge(api::health_routes())
        .with_state(state)
}
