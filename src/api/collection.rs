//! Collection API handlers
//!
//! The add/resume endpoints expose the confirmation workflow; workflow
//! outcomes are returned as structured JSON statuses, never thrown
//! across the boundary, so chat/UI/CLI front ends can render them
//! uniformly. The read endpoints back the collection browser.

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::db::collection::{self, CdRecord};
use crate::error::{ApiError, ApiResult};
use crate::models::{ResumeOutcome, StartOutcome, UserReply};
use crate::AppState;

/// POST /collection/add request
#[derive(Debug, Deserialize)]
pub struct AddCdRequest {
    /// Free-text query, e.g. "Radiohead - OK Computer 1997"
    pub query: String,
    /// Skip the pick step and select the top-ranked candidate
    #[serde(default)]
    pub auto_confirm: bool,
}

/// GET /collection/search parameters
#[derive(Debug, Deserialize)]
pub struct CollectionSearchParams {
    pub title: Option<String>,
    pub artist: Option<String>,
}

/// POST /collection/add
///
/// Start an add operation. Returns a ticket when human input is needed.
pub async fn add_cd(
    State(state): State<AppState>,
    Json(request): Json<AddCdRequest>,
) -> ApiResult<Json<StartOutcome>> {
    if request.query.trim().is_empty() {
        return Err(ApiError::BadRequest("Query must not be empty".to_string()));
    }

    let outcome = state
        .workflow
        .begin(&request.query, request.auto_confirm)
        .await?;

    Ok(Json(outcome))
}

/// POST /collection/add/{ticket}
///
/// Resume a suspended add operation with the user's reply.
pub async fn resume_add(
    State(state): State<AppState>,
    Path(ticket): Path<Uuid>,
    Json(reply): Json<UserReply>,
) -> ApiResult<Json<ResumeOutcome>> {
    let outcome = state.workflow.resume(ticket, &reply).await?;
    Ok(Json(outcome))
}

/// GET /collection
pub async fn list_cds(State(state): State<AppState>) -> ApiResult<Json<Vec<CdRecord>>> {
    let records = collection::list_all(&state.db).await?;
    Ok(Json(records))
}

/// GET /collection/{id}
pub async fn get_cd(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<CdRecord>> {
    let record = collection::get_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("CD not found: {}", id)))?;
    Ok(Json(record))
}

/// GET /collection/search?title=...&artist=...
///
/// Case-insensitive partial match; title takes precedence when both
/// parameters are supplied.
pub async fn search_cds(
    State(state): State<AppState>,
    Query(params): Query<CollectionSearchParams>,
) -> ApiResult<Json<Vec<CdRecord>>> {
    let records = if let Some(title) = params.title.filter(|t| !t.trim().is_empty()) {
        collection::search_by_title(&state.db, &title).await?
    } else if let Some(artist) = params.artist.filter(|a| !a.trim().is_empty()) {
        collection::search_by_artist(&state.db, &artist).await?
    } else {
        return Err(ApiError::BadRequest(
            "Provide a title or artist search term".to_string(),
        ));
    };
    Ok(Json(records))
}

/// Build collection routes
pub fn collection_routes() -> Router<AppState> {
    Router::new()
        .route("/collection", get(list_cds))
        .route("/collection/add", post(add_cd))
        .route("/collection/add/:ticket", post(resume_add))
        .route("/collection/search", get(search_cds))
        .route("/collection/:id", get(get_cd))
}
