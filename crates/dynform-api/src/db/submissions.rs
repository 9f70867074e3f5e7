//! Submission persistence operations.
//!
//! All functions take a `&PgPool` and operate on the `form_submissions` table.

use chrono::{DateTime, Utc};
use dynform_core::{Fingerprint, ValidatedSubmission};
use sqlx::PgPool;

use crate::store::{FieldsMapping, NewSubmission, StoreError, StoredSubmission};

/// Insert a new submission. A duplicate `data_hash` maps to
/// [`StoreError::UniqueConstraintViolation`].
pub async fn insert(pool: &PgPool, new: &NewSubmission) -> Result<StoredSubmission, StoreError> {
    let data = serde_json::to_value(&new.data)?;
    let mapping = serde_json::to_value(&new.fields_mapping)?;

    let row = sqlx::query_as::<_, SubmissionRow>(
        "INSERT INTO form_submissions (form_title, data, data_hash, fields_mapping)
         VALUES ($1, $2, $3, $4)
         RETURNING id, form_title, data, submitted_at, data_hash, fields_mapping",
    )
    .bind(&new.form_title)
    .bind(&data)
    .bind(new.data_hash.to_hex())
    .bind(&mapping)
    .fetch_one(pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => {
            StoreError::UniqueConstraintViolation(new.data_hash)
        }
        other => StoreError::Database(other),
    })?;

    row.into_record()
}

/// Whether a submission with this fingerprint exists.
pub async fn exists_by_hash(pool: &PgPool, fp: &Fingerprint) -> Result<bool, sqlx::Error> {
    let (exists,): (bool,) =
        sqlx::query_as("SELECT EXISTS (SELECT 1 FROM form_submissions WHERE data_hash = $1)")
            .bind(fp.to_hex())
            .fetch_one(pool)
            .await?;
    Ok(exists)
}

/// Every submission, oldest first.
pub async fn list_all(pool: &PgPool) -> Result<Vec<StoredSubmission>, StoreError> {
    let rows = sqlx::query_as::<_, SubmissionRow>(
        "SELECT id, form_title, data, submitted_at, data_hash, fields_mapping
         FROM form_submissions ORDER BY submitted_at, id",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(SubmissionRow::into_record).collect()
}

/// Delete every submission, returning the number of rows removed.
pub async fn delete_all(pool: &PgPool) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM form_submissions")
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct SubmissionRow {
    id: i64,
    form_title: String,
    data: serde_json::Value,
    submitted_at: DateTime<Utc>,
    data_hash: String,
    fields_mapping: serde_json::Value,
}

impl SubmissionRow {
    fn into_record(self) -> Result<StoredSubmission, StoreError> {
        let corrupt = |reason: String| StoreError::Corrupt {
            id: self.id,
            reason,
        };
        let data: ValidatedSubmission =
            serde_json::from_value(self.data.clone()).map_err(|e| corrupt(format!("data: {e}")))?;
        let data_hash: Fingerprint = self
            .data_hash
            .parse()
            .map_err(|e| corrupt(format!("data_hash: {e}")))?;
        let fields_mapping: FieldsMapping = serde_json::from_value(self.fields_mapping.clone())
            .map_err(|e| corrupt(format!("fields_mapping: {e}")))?;

        Ok(StoredSubmission {
            id: self.id,
            form_title: self.form_title,
            data,
            submitted_at: self.submitted_at,
            data_hash,
            fields_mapping,
        })
    }
}
