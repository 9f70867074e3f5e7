//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps form service, ingestion and store errors to HTTP status codes with
//! a JSON body `{error: {code, message, details?}}`. Internal error details
//! are logged and never returned to clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use dynform_schema::IngestError;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use utoipa::ToSchema;

use crate::service::FormError;
use crate::store::StoreError;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "INVALID_SCHEMA").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional details, present only for client errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Request body could not be parsed (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// An uploaded or persisted schema was rejected (400).
    #[error("invalid form schema: {0}")]
    InvalidSchema(IngestError),

    /// Request validation failed (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::InvalidSchema(_) => (StatusCode::BAD_REQUEST, "INVALID_SCHEMA"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::InvalidSchema(IngestError::Parse { line, column, .. }) => {
                Some(json!({ "line": line, "column": column }))
            }
            Self::InvalidSchema(IngestError::Shape { violations }) => Some(json!({
                "violations": violations
                    .iter()
                    .map(|v| json!({ "pointer": v.pointer, "message": v.message }))
                    .collect::<Vec<_>>()
            })),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Never expose internal error messages to clients.
        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        if matches!(&self, Self::Internal(_)) {
            tracing::error!(error = %self, "internal server error");
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details: self.details(),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<FormError> for AppError {
    fn from(err: FormError) -> Self {
        match err {
            FormError::NoSchemaLoaded => Self::NotFound("no form schema loaded".to_string()),
            FormError::NoSchemaFile => Self::NotFound("no form schema file found".to_string()),
            FormError::Ingest(IngestError::MetaSchema(reason)) => Self::Internal(reason),
            FormError::Ingest(e) => Self::InvalidSchema(e),
            FormError::Io(e) => Self::Internal(format!("schema file I/O failed: {e}")),
            FormError::Store(e) => e.into(),
            FormError::Canonicalization(e) => Self::Internal(e.to_string()),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        Self::Internal(err.to_string())
    }
}
