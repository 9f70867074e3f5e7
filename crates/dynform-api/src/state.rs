//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor.
//!
//! - **Configuration**: read once from the environment at startup.
//! - **Form registry**: the single active form, swapped atomically.
//! - **Schema lock**: serializes schema changes so the persisted file and
//!   the active form always describe the same upload.
//! - **Submission store**: Postgres when `DATABASE_URL` is set, otherwise
//!   in-memory.

use std::path::PathBuf;
use std::sync::Arc;

use dynform_validate::{Locale, UnknownLocale};
use metrics_exporter_prometheus::PrometheusHandle;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::registry::FormRegistry;
use crate::schema_file::SchemaFile;
use crate::store::SubmissionStore;

/// Default bind host.
pub const DEFAULT_HOST: &str = "0.0.0.0";
/// Default bind port.
pub const DEFAULT_PORT: u16 = 8000;
/// Default directory holding the persisted schema file.
pub const DEFAULT_SCHEMA_DIR: &str = "files/user_file";
/// Default CORS origin (the development form client).
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:3000";

/// Invalid configuration values.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// `PORT` is not a valid port number.
    #[error("PORT must be an integer between 0 and 65535, got \"{0}\"")]
    InvalidPort(String),

    /// `MESSAGE_LOCALE` is not a supported locale.
    #[error("MESSAGE_LOCALE: {0}")]
    InvalidLocale(#[from] UnknownLocale),
}

/// Application configuration.
///
/// Custom `Debug` redacts the `database_url`, which usually embeds a password.
#[derive(Clone)]
pub struct AppConfig {
    /// Host to bind the HTTP server to.
    pub host: String,
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Postgres connection string. `None` selects the in-memory store.
    pub database_url: Option<String>,
    /// Directory holding `current_form.json`.
    pub schema_dir: PathBuf,
    /// Origins allowed by CORS. `*` allows any origin.
    pub allowed_origins: Vec<String>,
    /// Locale used to render field error messages.
    pub locale: Locale,
    /// Emit logs as JSON lines instead of human-readable text.
    pub log_json: bool,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[REDACTED]"),
            )
            .field("schema_dir", &self.schema_dir)
            .field("allowed_origins", &self.allowed_origins)
            .field("locale", &self.locale)
            .field("log_json", &self.log_json)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            database_url: None,
            schema_dir: PathBuf::from(DEFAULT_SCHEMA_DIR),
            allowed_origins: vec![DEFAULT_ALLOWED_ORIGIN.to_string()],
            locale: Locale::English,
            log_json: false,
        }
    }
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    ///
    /// Unset and blank variables fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let port = match get("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(raw.clone()))?,
            None => defaults.port,
        };

        let allowed_origins = match get("ALLOWED_ORIGINS") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_owned)
                .collect(),
            None => defaults.allowed_origins,
        };

        let locale = match get("MESSAGE_LOCALE") {
            Some(raw) => raw.parse()?,
            None => defaults.locale,
        };

        Ok(Self {
            host: get("HOST").unwrap_or(defaults.host),
            port,
            database_url: get("DATABASE_URL"),
            schema_dir: get("SCHEMA_DIR").map(PathBuf::from).unwrap_or(defaults.schema_dir),
            allowed_origins,
            locale,
            log_json: get("LOG_FORMAT").is_some_and(|f| f.eq_ignore_ascii_case("json")),
        })
    }
}

/// Shared application state accessible to all route handlers.
///
/// Clone-friendly: every member is a handle over `Arc` internals.
#[derive(Clone)]
pub struct AppState {
    /// The single active form.
    pub forms: FormRegistry,
    /// Accepted submissions.
    pub store: SubmissionStore,
    /// Persisted copy of the last uploaded schema.
    pub schema_file: SchemaFile,
    /// Held across file write and activation. Async because the holder
    /// awaits file I/O.
    pub schema_lock: Arc<Mutex<()>>,
    /// Prometheus render handle, if a recorder was installed.
    pub metrics_handle: Option<PrometheusHandle>,
    /// Startup configuration.
    pub config: AppConfig,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("forms", &self.forms)
            .field("store", &self.store)
            .field("schema_file", &self.schema_file)
            .field("schema_lock", &self.schema_lock)
            .field("metrics", &self.metrics_handle.is_some())
            .field("config", &self.config)
            .finish()
    }
}

impl AppState {
    /// In-memory state with default configuration.
    pub fn new() -> Self {
        Self::with_config(AppConfig::default(), SubmissionStore::in_memory())
    }

    /// State for the given configuration and store.
    pub fn with_config(config: AppConfig, store: SubmissionStore) -> Self {
        Self {
            forms: FormRegistry::new(),
            store,
            schema_file: SchemaFile::new(&config.schema_dir),
            schema_lock: Arc::new(Mutex::new(())),
            metrics_handle: None,
            config,
        }
    }

    /// Attach a Prometheus handle for the `/metrics` endpoint.
    pub fn with_metrics_handle(mut self, handle: PrometheusHandle) -> Self {
        self.metrics_handle = Some(handle);
        self
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
