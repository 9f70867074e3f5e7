//! # Validate & Fingerprint Subcommands
//!
//! `validate` runs a submission through the same validator the API builds
//! from an uploaded schema and prints either the normalized data with its
//! fingerprint or the rendered error map. `fingerprint` hashes data that is
//! already normalized, e.g. the `data` of an exported submission.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde_json::{json, Value};

use dynform_core::{fingerprint, is_duplicate, Fingerprint, ValidatedSubmission};
use dynform_validate::{Locale, SubmissionValidator};

use crate::schema::load_schema;
use crate::{read_json, EXIT_REJECTED};

/// Arguments for the `dynform validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to the form schema JSON document.
    #[arg(long, value_name = "PATH")]
    pub schema: PathBuf,

    /// Path to the submission: a JSON object of field name → value.
    #[arg(value_name = "SUBMISSION")]
    pub submission: PathBuf,

    /// Locale for rendered error messages (en, he).
    #[arg(long, default_value = "en")]
    pub locale: Locale,

    /// Stored submissions to check for duplicates, as exported by
    /// `GET /submissions`.
    #[arg(long, value_name = "PATH")]
    pub existing: Option<PathBuf>,
}

/// Arguments for the `dynform fingerprint` subcommand.
#[derive(Args, Debug)]
pub struct FingerprintArgs {
    /// Path to normalized data: a JSON object of field name → string, number or null.
    #[arg(value_name = "DATA")]
    pub data: PathBuf,
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 when the submission is accepted, 1 when it has field
/// errors or duplicates an existing submission.
pub fn run_validate(args: &ValidateArgs) -> Result<u8> {
    let schema = load_schema(&args.schema)?
        .with_context(|| format!("schema {} was rejected", args.schema.display()))?;
    let validator = SubmissionValidator::build(&schema)
        .with_context(|| format!("schema {} was rejected", args.schema.display()))?;

    let payload = match read_json(&args.submission)? {
        Value::Object(map) => map,
        other => anyhow::bail!(
            "{} must contain a JSON object, found {}",
            args.submission.display(),
            json_kind(&other)
        ),
    };

    let data = match validator.validate(&payload) {
        Ok(data) => data,
        Err(errors) => {
            tracing::info!(%errors, "submission rejected");
            let rendered = errors.render(args.locale.catalog());
            println!("{}", serde_json::to_string_pretty(&json!({ "errors": rendered }))?);
            return Ok(EXIT_REJECTED);
        }
    };

    let fp = fingerprint(&data)?;

    if let Some(path) = &args.existing {
        let stored = read_fingerprints(path)?;
        if is_duplicate(&data, &stored)? {
            println!("DUPLICATE: {fp} is already stored in {}", path.display());
            return Ok(EXIT_REJECTED);
        }
    }

    let output = json!({ "data": data, "fingerprint": fp });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(0)
}

/// Execute the fingerprint subcommand.
pub fn run_fingerprint(args: &FingerprintArgs) -> Result<u8> {
    let data: ValidatedSubmission = serde_json::from_value(read_json(&args.data)?)
        .with_context(|| {
            format!(
                "{} must be an object of strings, numbers and nulls",
                args.data.display()
            )
        })?;
    println!("{}", fingerprint(&data)?);
    Ok(0)
}

/// Fingerprints of an exported submission list.
fn read_fingerprints(path: &Path) -> Result<Vec<Fingerprint>> {
    let rows = match read_json(path)? {
        Value::Array(rows) => rows,
        other => anyhow::bail!(
            "{} must contain a JSON array, found {}",
            path.display(),
            json_kind(&other)
        ),
    };

    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            let hash = row
                .get("data_hash")
                .and_then(Value::as_str)
                .with_context(|| format!("{}: entry {i} has no data_hash", path.display()))?;
            hash.parse::<Fingerprint>()
                .with_context(|| format!("{}: entry {i}", path.display()))
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
