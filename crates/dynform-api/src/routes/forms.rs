//! # Forms API
//!
//! Schema upload, activation and retrieval, plus submission of filled-in
//! forms against the active schema.

use std::collections::BTreeMap;

use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use dynform_core::{FormSchema, SubmissionPayload};
use dynform_schema::EXAMPLE_FORM_JSON;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{AppError, ErrorBody};
use crate::extractors::{extract_validated_json, Validate};
use crate::registry::ActiveForm;
use crate::service::{self, SubmitOutcome};
use crate::state::AppState;

/// Upper bound on keys in one submission.
pub const MAX_SUBMISSION_FIELDS: usize = 1024;

const DUPLICATE_MESSAGE: &str = "Identical form already submitted";

/// Returned whenever a schema becomes the active form.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SchemaActivatedResponse {
    pub message: String,
    pub form_id: Uuid,
    pub version: u64,
    #[schema(value_type = Object)]
    pub schema: FormSchema,
}

impl SchemaActivatedResponse {
    fn new(message: &str, form: &ActiveForm) -> Self {
        Self {
            message: message.to_string(),
            form_id: form.form_id,
            version: form.version,
            schema: form.schema.clone(),
        }
    }
}

/// Identity of the active form.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FormIdResponse {
    pub form_id: Uuid,
    pub version: u64,
}

/// A filled-in form.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitRequest {
    /// Field name → submitted value. Keys not declared by the form are ignored.
    #[schema(value_type = Object)]
    pub data: SubmissionPayload,
}

impl Validate for SubmitRequest {
    fn validate(&self) -> Result<(), String> {
        if self.data.len() > MAX_SUBMISSION_FIELDS {
            return Err(format!(
                "submission has {} keys, at most {MAX_SUBMISSION_FIELDS} are accepted",
                self.data.len()
            ));
        }
        Ok(())
    }
}

/// Outcome of a submission.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubmitResponse {
    pub success: bool,
    /// Field name → rendered messages, or `general` for duplicates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, Vec<String>>>,
    pub message: String,
    /// Identifier of the stored submission.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

/// Build the forms router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/forms/upload-schema", post(upload_schema))
        .route("/forms/current-schema", get(current_schema))
        .route("/forms/load-schema", get(load_schema))
        .route("/forms/current-form-id", get(current_form_id))
        .route("/forms/download-example", get(download_example))
        .route("/forms/submit", post(submit))
}

/// POST /forms/upload-schema: Ingest, persist and activate a schema document.
#[utoipa::path(
    post,
    path = "/forms/upload-schema",
    request_body(content = String, description = "Form schema JSON document", content_type = "application/json"),
    responses(
        (status = 200, description = "Schema activated", body = SchemaActivatedResponse),
        (status = 400, description = "Malformed or invalid schema", body = ErrorBody),
    ),
    tag = "forms"
)]
pub async fn upload_schema(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SchemaActivatedResponse>, AppError> {
    let form = service::upload_schema(&state, &body).await?;
    Ok(Json(SchemaActivatedResponse::new(
        "File saved successfully",
        &form,
    )))
}

/// GET /forms/current-schema: The active schema document.
#[utoipa::path(
    get,
    path = "/forms/current-schema",
    responses(
        (status = 200, description = "Active form schema document", content_type = "application/json"),
        (status = 404, description = "No schema uploaded", body = ErrorBody),
    ),
    tag = "forms"
)]
pub async fn current_schema(State(state): State<AppState>) -> Result<Json<FormSchema>, AppError> {
    let form = service::current_form(&state).await?;
    Ok(Json(form.schema.clone()))
}

/// GET /forms/load-schema: Re-activate the persisted schema file.
#[utoipa::path(
    get,
    path = "/forms/load-schema",
    responses(
        (status = 200, description = "Schema activated", body = SchemaActivatedResponse),
        (status = 400, description = "Persisted schema is invalid", body = ErrorBody),
        (status = 404, description = "No persisted schema", body = ErrorBody),
    ),
    tag = "forms"
)]
pub async fn load_schema(
    State(state): State<AppState>,
) -> Result<Json<SchemaActivatedResponse>, AppError> {
    let form = service::reload_schema(&state).await?;
    Ok(Json(SchemaActivatedResponse::new(
        "Schema loaded successfully",
        &form,
    )))
}

/// GET /forms/current-form-id: Identity of the active form.
#[utoipa::path(
    get,
    path = "/forms/current-form-id",
    responses(
        (status = 200, description = "Active form identity", body = FormIdResponse),
        (status = 404, description = "No schema loaded", body = ErrorBody),
    ),
    tag = "forms"
)]
pub async fn current_form_id(
    State(state): State<AppState>,
) -> Result<Json<FormIdResponse>, AppError> {
    let form = state
        .forms
        .snapshot()
        .ok_or_else(|| AppError::NotFound("no form schema loaded".to_string()))?;
    Ok(Json(FormIdResponse {
        form_id: form.form_id,
        version: form.version,
    }))
}

/// GET /forms/download-example: The bundled example schema as a download.
#[utoipa::path(
    get,
    path = "/forms/download-example",
    responses(
        (status = 200, description = "Example form schema", content_type = "application/json"),
    ),
    tag = "forms"
)]
pub async fn download_example() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "application/json"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"example_form.json\"",
            ),
        ],
        EXAMPLE_FORM_JSON,
    )
}

/// POST /forms/submit: Validate and store a filled-in form.
#[utoipa::path(
    post,
    path = "/forms/submit",
    request_body = SubmitRequest,
    responses(
        (status = 200, description = "Submission stored", body = SubmitResponse),
        (status = 404, description = "No schema loaded", body = ErrorBody),
        (status = 409, description = "Identical submission already stored", body = SubmitResponse),
        (status = 422, description = "Field validation errors", body = SubmitResponse),
    ),
    tag = "forms"
)]
pub async fn submit(
    State(state): State<AppState>,
    body: Result<Json<SubmitRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SubmitResponse>), AppError> {
    let req = extract_validated_json(body)?;

    let (status, response) = match service::submit(&state, &req.data).await? {
        SubmitOutcome::Accepted(stored) => (
            StatusCode::OK,
            SubmitResponse {
                success: true,
                errors: None,
                message: "Form submitted successfully".to_string(),
                id: Some(stored.id),
            },
        ),
        SubmitOutcome::Invalid(errors) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            SubmitResponse {
                success: false,
                errors: Some(errors.render(state.config.locale.catalog())),
                message: "Form has validation errors".to_string(),
                id: None,
            },
        ),
        SubmitOutcome::Duplicate => (
            StatusCode::CONFLICT,
            SubmitResponse {
                success: false,
                errors: Some(BTreeMap::from([(
                    "general".to_string(),
                    vec![DUPLICATE_MESSAGE.to_string()],
                )])),
                message: DUPLICATE_MESSAGE.to_string(),
                id: None,
            },
        ),
    };
    Ok((status, Json(response)))
}
