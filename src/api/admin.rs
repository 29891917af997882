//! Operator endpoints.

use crate::api::{ApiError, AppState};
use crate::config::SwitchyardConfig;
use crate::provider::build_entries;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub providers: usize,
    pub models: usize,
}

/// POST /admin/reload - Re-read the provider catalog from the config file.
///
/// The file is parsed and validated in full before anything is swapped; any
/// failure leaves the running catalog untouched. Only `[[providers]]` is
/// applied, other sections need a restart.
pub async fn reload(State(state): State<Arc<AppState>>) -> Result<Json<ReloadResponse>, ApiError> {
    let path = state
        .config_path
        .as_deref()
        .ok_or_else(|| ApiError::bad_request("Server was started without a config file"))?;

    let config = SwitchyardConfig::load(Some(path))
        .and_then(|c| {
            let c = c.with_env_overrides();
            c.validate()?;
            Ok(c)
        })
        .map_err(|e| {
            warn!(path = %path.display(), error = %e, "Reload rejected");
            ApiError::bad_request(&format!("Invalid configuration: {}", e))
        })?;

    let entries = build_entries(&config.providers, Arc::clone(&state.http_client))
        .map_err(|e| ApiError::bad_request(&format!("Invalid provider: {}", e)))?;
    let count = entries.len();
    state.dispatcher.reload(entries)?;

    info!(path = %path.display(), providers = count, "Configuration reloaded");
    Ok(Json(ReloadResponse {
        providers: count,
        models: state.dispatcher.registry().models().len(),
    }))
}

#[derive(Debug, Default, Deserialize)]
pub struct ResetParams {
    /// Also clear the provider's rolling health window.
    #[serde(default)]
    pub metrics: bool,
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub provider: String,
    pub breaker_reset: bool,
    pub metrics_reset: bool,
}

/// POST /admin/providers/:name/reset - Force a provider's breaker closed.
pub async fn reset_provider(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Query(params): Query<ResetParams>,
) -> Result<Json<ResetResponse>, ApiError> {
    state.dispatcher.reset_circuit_breaker(&name)?;
    if params.metrics {
        state.dispatcher.reset_metrics(&name)?;
    }

    info!(provider = %name, metrics = params.metrics, "Provider reset by operator");
    Ok(Json(ResetResponse {
        provider: name,
        breaker_reset: true,
        metrics_reset: params.metrics,
    }))
}
