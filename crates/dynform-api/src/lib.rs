//! # dynform-api: Axum API Service for Dynamic Forms
//!
//! Operators upload a form schema; clients fetch it, render the form and
//! submit filled-in data, which is validated against the active schema,
//! fingerprinted and stored once.
//!
//! ## API Surface
//!
//! | Prefix            | Module                         | Domain                 |
//! |-------------------|--------------------------------|------------------------|
//! | `/forms/*`        | [`routes::forms`]              | Schemas and submission |
//! | `/submissions`    | [`routes::submissions`]        | Stored submissions     |
//! | `/statistics`     | [`routes::statistics`]         | Per-form counts        |
//! | `/health/*`       | this module                    | Probes                 |
//! | `/metrics`        | this module                    | Prometheus exposition  |
//! | `/openapi.json`   | [`openapi`]                    | OpenAPI 3.1            |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! CorsLayer → TraceLayer → MetricsMiddleware → Handler
//! ```

pub mod bootstrap;
pub mod db;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod registry;
pub mod routes;
pub mod schema_file;
pub mod service;
pub mod state;
pub mod statistics;
pub mod store;

use axum::extract::State;
use axum::http::{header, HeaderValue, Method};
use axum::middleware::from_fn;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::middleware::metrics::ApiMetrics;
use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    let metrics = ApiMetrics::new();
    let cors = cors_layer(&state.config.allowed_origins);

    let api = Router::new()
        .merge(routes::forms::router())
        .merge(routes::submissions::router())
        .merge(routes::statistics::router())
        .merge(openapi::router())
        .route("/metrics", get(prometheus_metrics))
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(middleware::tracing_layer::layer())
        .layer(axum::Extension(metrics))
        .with_state(state);

    let health = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness));

    Router::new().merge(health).merge(api).layer(cors)
}

/// CORS for the configured origins. `*` allows any origin; credentials are
/// never allowed.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::from(Any)
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %o, "ignoring unparseable CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
}

/// GET /metrics: Prometheus text exposition. Empty when no recorder is installed.
async fn prometheus_metrics(State(state): State<AppState>) -> impl IntoResponse {
    let body = state
        .metrics_handle
        .as_ref()
        .map(|handle| handle.render())
        .unwrap_or_default();
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
}

/// Liveness probe: always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe: returns 200 when the application is ready to serve.
async fn readiness() -> &'static str {
    "ready"
}
