//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI 3.1 spec,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Dynamic Forms API",
        version = "0.1.0",
        description = "Upload a form schema, validate submissions against it, and store them with SHA-256 duplicate detection.",
        license(name = "AGPL-3.0-or-later")
    ),
    paths(
        // Forms
        crate::routes::forms::upload_schema,
        crate::routes::forms::current_schema,
        crate::routes::forms::load_schema,
        crate::routes::forms::current_form_id,
        crate::routes::forms::download_example,
        crate::routes::forms::submit,
        // Submissions
        crate::routes::submissions::list_submissions,
        crate::routes::submissions::delete_submissions,
        // Statistics
        crate::routes::statistics::get_statistics,
    ),
    components(schemas(
        // Error types
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        // Form DTOs
        crate::routes::forms::SchemaActivatedResponse,
        crate::routes::forms::FormIdResponse,
        crate::routes::forms::SubmitRequest,
        crate::routes::forms::SubmitResponse,
        // Submission records
        crate::store::StoredSubmission,
        crate::store::FieldsMapping,
        crate::store::FieldLabel,
        crate::routes::submissions::DeleteSubmissionsResponse,
        // Statistics
        crate::statistics::Statistics,
        crate::statistics::FormStatistics,
        crate::statistics::FieldStatistics,
    )),
    tags(
        (name = "forms", description = "Form schema management and submission"),
        (name = "submissions", description = "Stored submissions"),
        (name = "statistics", description = "Submission statistics"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json: Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
