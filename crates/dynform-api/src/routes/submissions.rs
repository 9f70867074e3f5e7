//! # Submissions API
//!
//! Read and bulk-delete stored submissions.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{AppError, ErrorBody};
use crate::state::AppState;
use crate::store::StoredSubmission;

/// Result of a bulk delete.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteSubmissionsResponse {
    pub message: String,
    pub deleted: u64,
}

/// Build the submissions router.
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/submissions",
        get(list_submissions).delete(delete_submissions),
    )
}

/// GET /submissions: Every stored submission, oldest first.
#[utoipa::path(
    get,
    path = "/submissions",
    responses(
        (status = 200, description = "Stored submissions", body = Vec<StoredSubmission>),
        (status = 500, description = "Store unavailable", body = ErrorBody),
    ),
    tag = "submissions"
)]
pub async fn list_submissions(
    State(state): State<AppState>,
) -> Result<Json<Vec<StoredSubmission>>, AppError> {
    Ok(Json(state.store.list_all().await?))
}

/// DELETE /submissions: Remove every stored submission.
#[utoipa::path(
    delete,
    path = "/submissions",
    responses(
        (status = 200, description = "Submissions deleted", body = DeleteSubmissionsResponse),
        (status = 500, description = "Store unavailable", body = ErrorBody),
    ),
    tag = "submissions"
)]
pub async fn delete_submissions(
    State(state): State<AppState>,
) -> Result<Json<DeleteSubmissionsResponse>, AppError> {
    let deleted = state.store.delete_all().await?;
    tracing::warn!(deleted, "all submissions deleted");
    Ok(Json(DeleteSubmissionsResponse {
        message: "All submissions deleted".to_string(),
        deleted,
    }))
}
