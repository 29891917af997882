//! Provider status endpoints.

use crate::api::AppState;
use crate::dispatch::ProviderHealthReport;
use axum::{extract::State, Json};
use std::sync::Arc;

/// GET /status - Per-provider tier, rolling metrics and breaker state.
pub async fn handle(State(state): State<Arc<AppState>>) -> Json<ProviderHealthReport> {
    Json(state.dispatcher.provider_health_report())
}

/// POST /check - Probe every enabled provider now, then report.
pub async fn check(State(state): State<Arc<AppState>>) -> Json<ProviderHealthReport> {
    tracing::info!("Manual health check triggered");
    Json(state.dispatcher.trigger_health_check().await)
}
