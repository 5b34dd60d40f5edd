//! Release catalogue API handlers
//!
//! Direct search against the external catalogue with ranking applied,
//! without opening a ticket. Useful for casual lookups, so the CD-format
//! penalty defaults to off here.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::models::{RankedCandidate, ReleaseDetail};
use crate::AppState;

const MAX_SEARCH_LIMIT: usize = 25;

/// GET /releases/search parameters
#[derive(Debug, Deserialize)]
pub struct ReleaseSearchParams {
    pub query: String,
    pub require_cd: Option<bool>,
    pub limit: Option<usize>,
}

/// GET /releases/search?query=...
///
/// Search the catalogue and return ranked candidates with scores.
pub async fn search_releases(
    State(state): State<AppState>,
    Query(params): Query<ReleaseSearchParams>,
) -> ApiResult<Json<Vec<RankedCandidate>>> {
    if params.query.trim().is_empty() {
        return Err(ApiError::BadRequest("Query must not be empty".to_string()));
    }
    let limit = params.limit.unwrap_or(10).clamp(1, MAX_SEARCH_LIMIT);

    let candidates = state.catalog.search(&params.query, limit).await?;
    let ranked = state
        .ranker
        .rank(&params.query, candidates, params.require_cd.unwrap_or(false));

    Ok(Json(ranked))
}

/// GET /releases/{id}
///
/// Full metadata for one release.
pub async fn get_release(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<Json<ReleaseDetail>> {
    let detail = state.catalog.fetch_detail(id).await?;
    Ok(Json(detail))
}

/// Build release catalogue routes
pub fn release_routes() -> Router<AppState> {
    Router::new()
        .route("/releases/search", get(search_releases))
        .route("/releases/:id", get(get_release))
}
