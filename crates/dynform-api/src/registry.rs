//! # Form Registry
//!
//! Holds the single active form. Activation builds everything first and then
//! swaps one `Arc` under a write lock, so a request holding a snapshot sees
//! either the old form or the new one, never a mix.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dynform_core::{FormSchema, SchemaError};
use dynform_validate::SubmissionValidator;
use parking_lot::RwLock;
use uuid::Uuid;

/// A fully built, immutable form.
#[derive(Debug)]
pub struct ActiveForm {
    /// Monotonically increasing activation counter, starting at 1.
    pub version: u64,
    /// Identifier assigned at activation.
    pub form_id: Uuid,
    /// The schema as ingested.
    pub schema: FormSchema,
    /// The validator built from `schema`.
    pub validator: SubmissionValidator,
    /// When this form became active.
    pub activated_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct RegistryState {
    current: Option<Arc<ActiveForm>>,
    last_version: u64,
}

/// Process-wide holder of the active form. Cloning shares the same registry.
#[derive(Debug, Clone, Default)]
pub struct FormRegistry {
    inner: Arc<RwLock<RegistryState>>,
}

impl FormRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a validator for `schema` without activating it.
    pub fn prepare(schema: &FormSchema) -> Result<SubmissionValidator, SchemaError> {
        SubmissionValidator::build(schema)
    }

    /// Make an already-built form the active one.
    pub fn install(&self, schema: FormSchema, validator: SubmissionValidator) -> Arc<ActiveForm> {
        let mut guard = self.inner.write();
        guard.last_version += 1;
        let form = Arc::new(ActiveForm {
            version: guard.last_version,
            form_id: Uuid::new_v4(),
            schema,
            validator,
            activated_at: Utc::now(),
        });
        guard.current = Some(Arc::clone(&form));
        form
    }

    /// Build and activate in one step.
    pub fn activate(&self, schema: FormSchema) -> Result<Arc<ActiveForm>, SchemaError> {
        let validator = Self::prepare(&schema)?;
        Ok(self.install(schema, validator))
    }

    /// The active form, if any. The returned `Arc` stays valid across swaps.
    pub fn snapshot(&self) -> Option<Arc<ActiveForm>> {
        self.inner.read().current.clone()
    }

    /// Version of the active form, or 0 when none is loaded.
    pub fn version(&self) -> u64 {
        self.inner
            .read()
            .current
            .as_ref()
            .map_or(0, |form| form.version)
    }
}
