//! # dynform-cli: CLI Tool for the Dynamic Forms Stack
//!
//! Offline counterpart of the API: check a schema document before uploading
//! it, validate a submission against a schema exactly as the server would,
//! and compute submission fingerprints.
//!
//! ## Subcommands
//!
//! - `dynform check-schema`: Ingest a schema document and report problems.
//! - `dynform validate`: Validate a submission against a schema.
//! - `dynform fingerprint`: Fingerprint already-normalized submission data.
//!
//! ## Exit codes
//!
//! `0` success, `1` the input was rejected, `2` operational error (unreadable
//! file, malformed arguments).
//!
//! ```bash
//! dynform check-schema files/user_file/current_form.json
//! dynform validate --schema form.json --locale he submission.json
//! dynform validate --schema form.json --existing submissions.json submission.json
//! ```

pub mod schema;
pub mod submit;

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

/// Exit code for rejected input.
pub const EXIT_REJECTED: u8 = 1;

/// Read and parse a JSON file.
pub fn read_json(path: &Path) -> Result<Value> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("{} is not valid JSON", path.display()))
}
