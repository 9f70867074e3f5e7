//! # Schema Ingestion
//!
//! `bytes → FormSchema` in four stages, each with a distinct failure:
//!
//! 1. JSON parsing → [`IngestError::Parse`] with line and column.
//! 2. Meta-schema check → [`IngestError::Shape`] listing every violation.
//! 3. Typed deserialization → [`IngestError::Shape`] with the residual serde
//!    mismatch.
//! 4. Structural invariants → [`IngestError::Construction`].
//!
//! Stages 2–4 are all "the document is JSON but not a usable form"; callers
//! that only care about that distinction use [`IngestError::is_shape_error`].

use std::sync::OnceLock;

use dynform_core::{FormSchema, SchemaError};
use serde_json::Value;
use thiserror::Error;

use crate::shape::{ShapeChecker, ShapeViolation};

/// The bundled example form, served to operators as a template.
pub const EXAMPLE_FORM_JSON: &str = include_str!("../schemas/example_form.json");

/// Errors returned by [`ingest`].
#[derive(Error, Debug)]
pub enum IngestError {
    /// The bytes are not valid JSON.
    #[error("invalid JSON at line {line}, column {column}: {message}")]
    Parse {
        /// 1-based line of the syntax error.
        line: usize,
        /// 1-based column of the syntax error.
        column: usize,
        /// Parser diagnostic.
        message: String,
    },

    /// The document does not have the shape of a form schema.
    #[error("form schema has {} shape error(s): {}", .violations.len(), join(.violations))]
    Shape {
        /// Every violation found.
        violations: Vec<ShapeViolation>,
    },

    /// The document is well shaped but violates a structural invariant.
    #[error("form schema is invalid: {0}")]
    Construction(#[from] SchemaError),

    /// The embedded meta-schema could not be compiled.
    #[error("form meta-schema unavailable: {0}")]
    MetaSchema(String),
}

impl IngestError {
    /// True for every failure caused by the document's content rather than
    /// its syntax or the environment.
    pub fn is_shape_error(&self) -> bool {
        matches!(self, Self::Shape { .. } | Self::Construction(_))
    }
}

fn join(violations: &[ShapeViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

static SHAPE_CHECKER: OnceLock<Result<ShapeChecker, String>> = OnceLock::new();

fn shape_checker() -> Result<&'static ShapeChecker, IngestError> {
    SHAPE_CHECKER
        .get_or_init(ShapeChecker::compile)
        .as_ref()
        .map_err(|reason| IngestError::MetaSchema(reason.clone()))
}

/// Ingest raw bytes into a checked form schema.
pub fn ingest(bytes: &[u8]) -> Result<FormSchema, IngestError> {
    let document: Value = serde_json::from_slice(bytes).map_err(|e| IngestError::Parse {
        line: e.line(),
        column: e.column(),
        message: e.to_string(),
    })?;
    ingest_value(document)
}

/// Ingest an already-parsed JSON document (stages 2–4).
pub fn ingest_value(document: Value) -> Result<FormSchema, IngestError> {
    let violations = shape_checker()?.violations(&document);
    if !violations.is_empty() {
        return Err(IngestError::Shape { violations });
    }

    let schema: FormSchema = serde_json::from_value(document).map_err(|e| IngestError::Shape {
        violations: vec![ShapeViolation {
            pointer: String::new(),
            message: e.to_string(),
        }],
    })?;

    schema.check_invariants()?;
    Ok(schema)
}

/// The bundled example form, parsed.
pub fn example_form() -> Result<FormSchema, IngestError> {
    ingest(EXAMPLE_FORM_JSON.as_bytes())
}
