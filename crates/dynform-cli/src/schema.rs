//! # Check-Schema Subcommand
//!
//! Runs a schema document through the same ingestion stages the API applies
//! on upload, so operators can fix a document before it reaches the server.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use dynform_core::FormSchema;
use dynform_schema::{ingest, IngestError};

use crate::EXIT_REJECTED;

/// Arguments for the `dynform check-schema` subcommand.
#[derive(Args, Debug)]
pub struct CheckSchemaArgs {
    /// Path to the form schema JSON document.
    #[arg(value_name = "PATH")]
    pub path: PathBuf,
}

/// Execute the check-schema subcommand.
///
/// Returns exit code: 0 when the schema ingests, 1 when it is rejected.
pub fn run_check_schema(args: &CheckSchemaArgs) -> Result<u8> {
    match load_schema(&args.path)? {
        Ok(schema) => {
            println!("OK: {} ({} fields)", schema.title, schema.fields.len());
            for field in &schema.fields {
                let required = if field.required { ", required" } else { "" };
                println!("  {}: {}{}", field.name, field.field_type, required);
            }
            Ok(0)
        }
        Err(e) => {
            println!("FAIL: {}", args.path.display());
            for line in describe(&e) {
                println!("  {line}");
            }
            Ok(EXIT_REJECTED)
        }
    }
}

/// Ingest the schema at `path`.
///
/// The outer error is operational (unreadable file, unusable meta-schema);
/// the inner one means the document itself was rejected.
pub fn load_schema(path: &Path) -> Result<Result<FormSchema, IngestError>> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    match ingest(&bytes) {
        Err(IngestError::MetaSchema(reason)) => {
            anyhow::bail!("form meta-schema unavailable: {reason}")
        }
        other => {
            tracing::debug!(path = %path.display(), ok = other.is_ok(), "schema ingested");
            Ok(other)
        }
    }
}

fn describe(err: &IngestError) -> Vec<String> {
    match err {
        IngestError::Shape { violations } => violations.iter().map(ToString::to_string).collect(),
        other => vec![other.to_string()],
    }
}
