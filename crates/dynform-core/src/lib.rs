#![deny(missing_docs)]

//! # dynform-core: Foundational Types for the Dynamic Forms Stack
//!
//! This crate defines the types every other crate in the workspace depends
//! on. It has no internal crate dependencies, only `serde`, `serde_json`,
//! `thiserror`, `chrono`, `fancy-regex`, and `sha2` from the external ecosystem.
//!
//! ## Design Principles
//!
//! 1. **The schema document is the wire format.** [`FormSchema`] and its
//!    parts deserialize directly from the camelCase JSON an operator uploads.
//!    Structural invariants (unique names, known types, dropdown options,
//!    coherent constraints) are checked by [`FormSchema::check_invariants`],
//!    never deferred to submission time.
//!
//! 2. **[`CanonicalBytes`] is the sole path to fingerprint computation.**
//!    Every [`Fingerprint`] in the stack is computed over canonical JSON
//!    (sorted keys, compact separators), so two submissions with the same
//!    key/value set always collide regardless of insertion order.
//!
//! 3. **Explicit absence.** [`FieldValue::Empty`] marks an optional field
//!    that received no value, so "absent" stays distinguishable from
//!    "never declared".
//!
//! 4. **Structured errors with `thiserror`.** No `Box<dyn Error>`, no
//!    `.unwrap()` outside tests.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod fingerprint;
pub mod schema;
pub mod submission;

// Re-export primary types at crate root for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use digest::{sha256_digest, Fingerprint};
pub use error::{CanonicalizationError, FingerprintParseError, SchemaError};
pub use fingerprint::{fingerprint, is_duplicate};
pub use schema::{
    parse_iso_date, DropdownOption, ErrorMessageKey, FieldConstraint, FieldDefinition,
    FieldErrorMessages, FieldType, FormSchema, DATE_FORMAT,
};
pub use submission::{FieldValue, SubmissionPayload, ValidatedSubmission};
