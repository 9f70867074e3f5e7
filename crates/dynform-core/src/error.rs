//! # Error Hierarchy
//!
//! Structured error types for the form model, built with `thiserror`.
//!
//! Each variant carries the diagnostic context an operator needs to fix an
//! uploaded schema without guesswork: the offending field name and the
//! constraint or value that was rejected.

use thiserror::Error;

/// Construction-time errors: the schema itself is malformed.
///
/// These surface immediately when a schema is uploaded or loaded and are
/// never deferred to submission time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A field has an empty `name`.
    #[error("field #{index} has an empty name")]
    EmptyFieldName {
        /// Zero-based position of the field in the schema.
        index: usize,
    },

    /// Two fields share the same `name`.
    #[error("duplicate field name: \"{0}\"")]
    DuplicateFieldName(String),

    /// A field declares a `type` outside the six supported kinds.
    #[error("field \"{field}\" has unsupported type \"{field_type}\" (expected one of text, email, password, date, number, dropdown)")]
    UnsupportedFieldType {
        /// The field name.
        field: String,
        /// The rejected type string.
        field_type: String,
    },

    /// A dropdown field has no options.
    #[error("dropdown field \"{0}\" must declare at least one option")]
    MissingDropdownOptions(String),

    /// A `pattern` constraint is not a valid regular expression.
    #[error("field \"{field}\" has an invalid pattern: {reason}")]
    InvalidPattern {
        /// The field name.
        field: String,
        /// Compiler diagnostic.
        reason: String,
    },

    /// A constraint set is incoherent (e.g. `min > max`, unparseable `minDate`).
    #[error("field \"{field}\" has an invalid constraint: {reason}")]
    InvalidConstraint {
        /// The field name.
        field: String,
        /// Human-readable reason for the rejection.
        reason: String,
    },
}

/// Errors during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// JSON serialization failed during canonicalization.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// A stored fingerprint string could not be decoded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid fingerprint \"{value}\": expected 64 lowercase hex characters")]
pub struct FingerprintParseError {
    /// The rejected input.
    pub value: String,
}
