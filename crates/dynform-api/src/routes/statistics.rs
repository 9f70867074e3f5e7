//! # Statistics API

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::error::{AppError, ErrorBody};
use crate::state::AppState;
use crate::statistics::{statistics, Statistics};

/// Build the statistics router.
pub fn router() -> Router<AppState> {
    Router::new().route("/statistics", get(get_statistics))
}

/// GET /statistics: Submission counts per form title.
#[utoipa::path(
    get,
    path = "/statistics",
    responses(
        (status = 200, description = "Submission statistics", body = Statistics),
        (status = 500, description = "Store unavailable", body = ErrorBody),
    ),
    tag = "statistics"
)]
pub async fn get_statistics(State(state): State<AppState>) -> Result<Json<Statistics>, AppError> {
    let submissions = state.store.list_all().await?;
    Ok(Json(statistics(&submissions)))
}
