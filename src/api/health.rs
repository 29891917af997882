//! Liveness endpoint handler.

use crate::api::AppState;
use crate::resilience::CircuitState;
use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_seconds: u64,
    pub providers: ProviderCounts,
    pub models: usize,
}

/// Provider counts by routability.
#[derive(Debug, Serialize)]
pub struct ProviderCounts {
    pub total: usize,
    pub routable: usize,
    pub open_circuits: usize,
}

/// GET /health - Return process liveness and a coarse provider summary.
pub async fn handle(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let report = state.dispatcher.provider_health_report();
    let enabled: Vec<_> = report.values().filter(|s| s.enabled).collect();
    let routable = enabled.iter().filter(|s| s.tier.is_routable()).count();
    let open_circuits = enabled
        .iter()
        .filter(|s| s.breaker.state == CircuitState::Open)
        .count();

    let status = match (routable, enabled.len()) {
        (r, t) if r == t && t > 0 => "healthy",
        (r, _) if r > 0 => "degraded",
        _ => "unhealthy",
    };

    Json(HealthResponse {
        status: status.to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        providers: ProviderCounts {
            total: report.len(),
            routable,
            open_circuits,
        },
        models: state.dispatcher.registry().models().len(),
    })
}
