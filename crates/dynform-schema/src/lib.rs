//! # dynform-schema: Form Schema Ingestion
//!
//! Turns the raw bytes of an uploaded form document into a checked
//! [`FormSchema`](dynform_core::FormSchema).
//!
//! ## Responsibilities
//!
//! - **Shape checking:** validate the parsed document against the embedded
//!   `form.schema.json` (JSON Schema Draft 2020-12) and report every
//!   violation with its JSON Pointer.
//! - **Ingestion:** parse → shape check → typed deserialization → structural
//!   invariants, each stage with its own error variant.
//! - **Example form:** the bundled `example_form.json` served to operators
//!   as a starting template.

pub mod ingest;
pub mod shape;

pub use ingest::{example_form, ingest, ingest_value, IngestError, EXAMPLE_FORM_JSON};
pub use shape::{ShapeChecker, ShapeViolation, FORM_META_SCHEMA};
