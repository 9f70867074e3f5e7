//! # Submission Store Gateway
//!
//! Persistence of accepted submissions, keyed by fingerprint.
//!
//! Two backends share one interface:
//!
//! - **Postgres** (`DATABASE_URL` set): the `UNIQUE (data_hash)` constraint
//!   is the authoritative duplicate guard; a violation on insert surfaces as
//!   [`StoreError::UniqueConstraintViolation`].
//! - **In-memory**: the fingerprint check and the insert run under one write
//!   lock, which gives the same guarantee within a single process.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dynform_core::{FieldType, Fingerprint, FormSchema, ValidatedSubmission};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use thiserror::Error;
use utoipa::ToSchema;

/// Errors returned by the submission store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A submission with the same fingerprint already exists.
    #[error("a submission with fingerprint {0} already exists")]
    UniqueConstraintViolation(Fingerprint),

    /// The database rejected the operation.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored row could not be decoded.
    #[error("stored submission {id} is corrupt: {reason}")]
    Corrupt {
        /// Row identifier.
        id: i64,
        /// What failed to decode.
        reason: String,
    },

    /// A record could not be encoded for storage.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// One declared field and its display label, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FieldLabel {
    /// Field name.
    pub name: String,
    /// Display label at submission time.
    pub label: String,
}

/// Display context captured alongside a submission.
///
/// Rows written before labels were captured hold `{}`, which decodes as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct FieldsMapping {
    /// Every field of the form, in declaration order.
    pub fields_mapping: Vec<FieldLabel>,
    /// For dropdown fields: field name → label of the selected option.
    pub selected_options_labels: BTreeMap<String, String>,
}

impl FieldsMapping {
    /// Capture labels from `schema` for the values in `data`.
    pub fn capture(schema: &FormSchema, data: &ValidatedSubmission) -> Self {
        let fields_mapping = schema
            .fields
            .iter()
            .map(|f| FieldLabel {
                name: f.name.clone(),
                label: f.label.clone(),
            })
            .collect();

        let selected_options_labels = schema
            .fields
            .iter()
            .filter(|f| FieldType::parse(&f.field_type) == Some(FieldType::Dropdown))
            .filter_map(|f| {
                let chosen = data.get(&f.name)?.as_text()?;
                let label = f.option_label(chosen)?;
                Some((f.name.clone(), label.to_string()))
            })
            .collect();

        Self {
            fields_mapping,
            selected_options_labels,
        }
    }
}

/// A submission ready to be stored.
#[derive(Debug, Clone)]
pub struct NewSubmission {
    /// Title of the form it was validated against.
    pub form_title: String,
    /// Normalized data.
    pub data: ValidatedSubmission,
    /// Fingerprint of `data`.
    pub data_hash: Fingerprint,
    /// Label context.
    pub fields_mapping: FieldsMapping,
}

/// A persisted submission. Never mutated; removed only by bulk delete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StoredSubmission {
    /// Store-assigned identifier.
    pub id: i64,
    /// Title of the form it was validated against.
    pub form_title: String,
    /// Normalized data; optional fields without a value are `null`.
    #[schema(value_type = Object)]
    pub data: ValidatedSubmission,
    /// When the submission was accepted.
    pub submitted_at: DateTime<Utc>,
    /// SHA-256 fingerprint of `data`, 64 hex characters.
    #[schema(value_type = String)]
    pub data_hash: Fingerprint,
    /// Label context captured at submission time.
    pub fields_mapping: FieldsMapping,
}

#[derive(Debug, Default)]
struct MemoryState {
    last_id: i64,
    rows: Vec<StoredSubmission>,
    hashes: HashSet<Fingerprint>,
}

/// Gateway over the configured backend. Cloning shares the same store.
#[derive(Clone)]
pub struct SubmissionStore {
    db_pool: Option<PgPool>,
    memory: Arc<RwLock<MemoryState>>,
}

impl std::fmt::Debug for SubmissionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmissionStore")
            .field("backend", &self.backend())
            .finish()
    }
}

impl SubmissionStore {
    /// A process-local store.
    pub fn in_memory() -> Self {
        Self {
            db_pool: None,
            memory: Arc::default(),
        }
    }

    /// A Postgres-backed store.
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            db_pool: Some(pool),
            memory: Arc::default(),
        }
    }

    /// `"postgres"` or `"memory"`.
    pub fn backend(&self) -> &'static str {
        if self.db_pool.is_some() {
            "postgres"
        } else {
            "memory"
        }
    }

    /// Store a new submission.
    pub async fn insert(&self, new: NewSubmission) -> Result<StoredSubmission, StoreError> {
        if let Some(pool) = &self.db_pool {
            return crate::db::submissions::insert(pool, &new).await;
        }

        let mut state = self.memory.write();
        if !state.hashes.insert(new.data_hash) {
            return Err(StoreError::UniqueConstraintViolation(new.data_hash));
        }
        state.last_id += 1;
        let record = StoredSubmission {
            id: state.last_id,
            form_title: new.form_title,
            data: new.data,
            submitted_at: Utc::now(),
            data_hash: new.data_hash,
            fields_mapping: new.fields_mapping,
        };
        state.rows.push(record.clone());
        Ok(record)
    }

    /// Whether any stored submission has this fingerprint.
    pub async fn exists_by_fingerprint(&self, fp: &Fingerprint) -> Result<bool, StoreError> {
        match &self.db_pool {
            Some(pool) => Ok(crate::db::submissions::exists_by_hash(pool, fp).await?),
            None => Ok(self.memory.read().hashes.contains(fp)),
        }
    }

    /// Every stored submission, oldest first.
    pub async fn list_all(&self) -> Result<Vec<StoredSubmission>, StoreError> {
        match &self.db_pool {
            Some(pool) => crate::db::submissions::list_all(pool).await,
            None => Ok(self.memory.read().rows.clone()),
        }
    }

    /// Delete every stored submission, returning how many were removed.
    pub async fn delete_all(&self) -> Result<u64, StoreError> {
        match &self.db_pool {
            Some(pool) => Ok(crate::db::submissions::delete_all(pool).await?),
            None => {
                let mut state = self.memory.write();
                let removed = state.rows.len() as u64;
                state.rows.clear();
                state.hashes.clear();
                Ok(removed)
            }
        }
    }
}
