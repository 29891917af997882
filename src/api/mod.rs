//! # HTTP Surface
//!
//! OpenAI-compatible front door for the dispatch core.
//!
//! ## Endpoints
//!
//! - `POST /v1/chat/completions` - Chat completion (non-streaming)
//! - `GET /v1/models` - Models served by at least one enabled provider
//! - `GET /status` - Per-provider tier, metrics and breaker state
//! - `POST /check` - Run one probe round now and return the refreshed status
//! - `GET /health` - Liveness with provider counts
//! - `POST /admin/reload` - Re-read the provider catalog from the config file
//! - `POST /admin/providers/:name/reset` - Close a breaker (`?metrics=true` also clears its window)
//! - `GET /metrics` - Prometheus text
//!
//! ## Example
//!
//! ```no_run
//! use switchyard::api::{create_router, AppState};
//! use switchyard::config::SwitchyardConfig;
//! use switchyard::dispatch::Dispatcher;
//! use switchyard::registry::ProviderRegistry;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Arc::new(SwitchyardConfig::default());
//! let dispatcher = Arc::new(Dispatcher::new(Arc::new(ProviderRegistry::empty()), &config));
//! let state = Arc::new(AppState::new(dispatcher, config, Arc::new(reqwest::Client::new())));
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
//! axum::serve(listener, create_router(state)).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Errors
//!
//! Every failure is an OpenAI-style envelope:
//! ```json
//! {
//!   "error": {
//!     "message": "Model 'gpt-4' not found. Available: llama3",
//!     "type": "invalid_request_error",
//!     "param": "model",
//!     "code": "model_not_found"
//!   }
//! }
//! ```
//! A dispatch that exhausted its candidates answers 503 and lists the
//! attempts it made under `attempts`.

mod admin;
mod completions;
pub mod error;
mod health;
mod models;
mod status;
pub mod types;

pub use error::DispatchFailure;
pub use types::*;

use crate::config::SwitchyardConfig;
use crate::dispatch::Dispatcher;
use crate::metrics::PrometheusHandle;
use axum::{
    routing::{get, post},
    Router,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Maximum request body size (10 MB).
const MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

/// Shared application state accessible to all handlers.
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub config: Arc<SwitchyardConfig>,
    /// File the catalog is re-read from on `/admin/reload`.
    pub config_path: Option<PathBuf>,
    /// Client shared by every provider built on reload.
    pub http_client: Arc<reqwest::Client>,
    pub prometheus: PrometheusHandle,
    pub start_time: Instant,
    /// Parent of every per-request cancellation token.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(
        dispatcher: Arc<Dispatcher>,
        config: Arc<SwitchyardConfig>,
        http_client: Arc<reqwest::Client>,
    ) -> Self {
        Self {
            dispatcher,
            config,
            config_path: None,
            http_client,
            prometheus: crate::metrics::metrics_handle(),
            start_time: Instant::now(),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    pub fn with_shutdown(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    /// Overall deadline for one dispatch.
    pub fn request_timeout(&self) -> Duration {
        self.config.server.request_timeout()
    }
}

/// Create the main API router with all endpoints configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/chat/completions", post(completions::handle))
        .route("/v1/models", get(models::handle))
        .route("/status", get(status::handle))
        .route("/check", post(status::check))
        .route("/health", get(health::handle))
        .route("/admin/reload", post(admin::reload))
        .route("/admin/providers/:name/reset", post(admin::reset_provider))
        .route("/metrics", get(crate::metrics::handler::metrics_handler))
        .layer(axum::middleware::from_fn(
            crate::logging::middleware::request_id,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
        .with_state(state)
}
