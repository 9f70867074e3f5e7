//! # Startup Bootstrap
//!
//! Builds [`AppState`] from [`AppConfig`]:
//!
//! 1. **Store**: connect to Postgres and apply migrations when
//!    `DATABASE_URL` is set, otherwise use the in-memory store.
//! 2. **Form**: activate the persisted schema file if one exists. A missing
//!    file is normal; a broken one is logged and skipped so the service can
//!    still accept a fresh upload.

use crate::db;
use crate::service::{self, FormError};
use crate::state::{AppConfig, AppState};
use crate::store::SubmissionStore;

/// Errors during bootstrap.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    /// The database could not be reached or migrated.
    #[error("database initialization failed: {0}")]
    Database(#[from] sqlx::Error),
}

/// Build the application state for `config`.
pub async fn bootstrap(config: AppConfig) -> Result<AppState, BootstrapError> {
    let store = match db::init_pool(config.database_url.as_deref()).await? {
        Some(pool) => SubmissionStore::postgres(pool),
        None => SubmissionStore::in_memory(),
    };

    let state = AppState::with_config(config, store);
    restore_form(&state).await;

    tracing::info!(
        store = state.store.backend(),
        schema_file = %state.schema_file.path().display(),
        locale = %state.config.locale,
        form_loaded = state.forms.snapshot().is_some(),
        "bootstrap complete"
    );
    Ok(state)
}

async fn restore_form(state: &AppState) {
    match service::reload_schema(state).await {
        Ok(_) => {}
        Err(FormError::NoSchemaFile) => {
            tracing::info!("no persisted form schema; waiting for upload");
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                path = %state.schema_file.path().display(),
                "persisted form schema could not be activated"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_in(dir: &std::path::Path) -> AppConfig {
        AppConfig {
            schema_dir: dir.to_path_buf(),
            ..AppConfig::default()
        }
    }

    #[tokio::test]
    async fn empty_dir_boots_without_form() {
        let dir = tempfile::tempdir().unwrap();
        let state = bootstrap(config_in(dir.path())).await.unwrap();
        assert!(state.forms.snapshot().is_none());
        assert_eq!(state.store.backend(), "memory");
    }

    #[tokio::test]
    async fn persisted_schema_is_activated() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(crate::schema_file::CURRENT_FORM_FILE),
            dynform_schema::EXAMPLE_FORM_JSON,
        )
        .unwrap();
        let state = bootstrap(config_in(dir.path())).await.unwrap();
        assert_eq!(
            state.forms.snapshot().unwrap().schema.title,
            "Customer Registration"
        );
    }

    #[tokio::test]
    async fn broken_schema_file_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(crate::schema_file::CURRENT_FORM_FILE),
            "{ not json",
        )
        .unwrap();
        let state = bootstrap(config_in(dir.path())).await.unwrap();
        assert!(state.forms.snapshot().is_none());
    }
}
