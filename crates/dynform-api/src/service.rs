//! # Form Service
//!
//! The operations behind the `/forms` routes, kept free of HTTP types so
//! bootstrap and tests can drive them directly.
//!
//! ## Submit pipeline
//!
//! ```text
//! snapshot ─▶ validate ─▶ fingerprint ─▶ exists? ─▶ insert
//!    │            │                          │          │
//!    ▼            ▼                          ▼          ▼
//! NoSchema     Invalid                   Duplicate  Accepted | Duplicate
//! ```
//!
//! The pre-insert existence check is an optimization; the store's unique
//! constraint on the fingerprint is what makes duplicates impossible.

use std::sync::Arc;

use dynform_core::{fingerprint, CanonicalizationError, SchemaError, SubmissionPayload};
use dynform_schema::{ingest, IngestError};
use dynform_validate::FieldErrors;
use thiserror::Error;

use crate::registry::{ActiveForm, FormRegistry};
use crate::state::AppState;
use crate::store::{FieldsMapping, NewSubmission, StoreError, StoredSubmission};

/// Errors from form operations.
#[derive(Error, Debug)]
pub enum FormError {
    /// No form has been activated yet.
    #[error("no form schema loaded")]
    NoSchemaLoaded,

    /// No persisted schema file exists.
    #[error("no form schema file found")]
    NoSchemaFile,

    /// The schema document was rejected.
    #[error(transparent)]
    Ingest(#[from] IngestError),

    /// Reading or writing the persisted schema failed.
    #[error("schema file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The submission store failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Validated data could not be canonicalized.
    #[error("fingerprint computation failed: {0}")]
    Canonicalization(#[from] CanonicalizationError),
}

impl From<SchemaError> for FormError {
    fn from(err: SchemaError) -> Self {
        Self::Ingest(IngestError::Construction(err))
    }
}

/// Result of a submission attempt that reached the validator.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// Stored under a new fingerprint.
    Accepted(StoredSubmission),
    /// One or more fields failed validation. Nothing was stored.
    Invalid(FieldErrors),
    /// An identical submission is already stored.
    Duplicate,
}

impl SubmitOutcome {
    fn label(&self) -> &'static str {
        match self {
            Self::Accepted(_) => "accepted",
            Self::Invalid(_) => "invalid",
            Self::Duplicate => "duplicate",
        }
    }
}

/// Ingest, persist and activate an uploaded schema.
///
/// The file is written only after the schema and its validator are fully
/// built, so a rejected upload leaves both the file and the active form
/// untouched. Write and install happen under the schema lock: the last
/// upload to persist is also the one left active.
pub async fn upload_schema(state: &AppState, bytes: &[u8]) -> Result<Arc<ActiveForm>, FormError> {
    let schema = ingest(bytes)?;
    let validator = FormRegistry::prepare(&schema)?;
    let _guard = state.schema_lock.lock().await;
    state.schema_file.write(bytes).await?;
    let form = state.forms.install(schema, validator);
    record_activation(&form, "upload");
    Ok(form)
}

/// Re-ingest the persisted schema file and activate it.
pub async fn reload_schema(state: &AppState) -> Result<Arc<ActiveForm>, FormError> {
    let _guard = state.schema_lock.lock().await;
    let bytes = state
        .schema_file
        .read()
        .await?
        .ok_or(FormError::NoSchemaFile)?;
    let schema = ingest(&bytes)?;
    let form = state.forms.activate(schema)?;
    record_activation(&form, "file");
    Ok(form)
}

/// The active form, falling back to the persisted file.
pub async fn current_form(state: &AppState) -> Result<Arc<ActiveForm>, FormError> {
    match state.forms.snapshot() {
        Some(form) => Ok(form),
        None => reload_schema(state).await,
    }
}

/// Validate, deduplicate and store one submission.
pub async fn submit(
    state: &AppState,
    payload: &SubmissionPayload,
) -> Result<SubmitOutcome, FormError> {
    let form = state.forms.snapshot().ok_or(FormError::NoSchemaLoaded)?;
    let outcome = submit_to(state, &form, payload).await?;
    metrics::counter!("dynform_submissions_total", "outcome" => outcome.label()).increment(1);
    Ok(outcome)
}

async fn submit_to(
    state: &AppState,
    form: &ActiveForm,
    payload: &SubmissionPayload,
) -> Result<SubmitOutcome, FormError> {
    let data = match form.validator.validate(payload) {
        Ok(data) => data,
        Err(errors) => {
            tracing::debug!(form = %form.schema.title, %errors, "submission rejected");
            return Ok(SubmitOutcome::Invalid(errors));
        }
    };

    let data_hash = fingerprint(&data)?;
    if state.store.exists_by_fingerprint(&data_hash).await? {
        tracing::info!(fingerprint = %data_hash, "duplicate submission");
        return Ok(SubmitOutcome::Duplicate);
    }

    let new = NewSubmission {
        form_title: form.schema.title.clone(),
        fields_mapping: FieldsMapping::capture(&form.schema, &data),
        data,
        data_hash,
    };
    store_new(state, new).await
}

/// Insert a submission that passed the existence check.
async fn store_new(state: &AppState, new: NewSubmission) -> Result<SubmitOutcome, FormError> {
    match state.store.insert(new).await {
        Ok(stored) => {
            tracing::info!(id = stored.id, form = %stored.form_title, "submission stored");
            Ok(SubmitOutcome::Accepted(stored))
        }
        // Lost a race with a concurrent identical submission.
        Err(StoreError::UniqueConstraintViolation(fp)) => {
            tracing::info!(fingerprint = %fp, "duplicate submission");
            Ok(SubmitOutcome::Duplicate)
        }
        Err(e) => Err(e.into()),
    }
}

fn record_activation(form: &ActiveForm, source: &'static str) {
    metrics::counter!("dynform_schema_activations_total", "source" => source).increment(1);
    tracing::info!(
        title = %form.schema.title,
        fields = form.schema.fields.len(),
        version = form.version,
        form_id = %form.form_id,
        source,
        "form activated"
    );
}
