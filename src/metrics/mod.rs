//! # Metrics
//!
//! Prometheus export for the dispatch core.
//!
//! **Counters:**
//! - `switchyard_dispatch_total{model, outcome}` - Dispatches by terminal outcome
//! - `switchyard_attempts_total{provider, outcome}` - Provider attempts by error class
//! - `switchyard_fallbacks_total{provider}` - Fallbacks onto a provider
//! - `switchyard_remediations_total` - Context condensations applied
//!
//! **Histograms:**
//! - `switchyard_attempt_latency_seconds{provider}` - Per-attempt latency
//!
//! **Gauges** (refreshed on scrape):
//! - `switchyard_providers_total` - Configured providers
//! - `switchyard_providers_routable` - Providers in a routable health tier
//! - `switchyard_breakers_open` - Providers whose breaker is not closed

pub mod handler;

pub use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::dispatch::Dispatcher;
use crate::resilience::CircuitState;

/// Latency buckets in seconds, sized for LLM calls.
const LATENCY_BUCKETS: &[f64] = &[
    0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0,
];

/// Install the global Prometheus recorder.
pub fn setup_metrics() -> Result<PrometheusHandle, Box<dyn std::error::Error>> {
    use metrics_exporter_prometheus::Matcher;

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("switchyard_attempt_latency_seconds".to_string()),
            LATENCY_BUCKETS,
        )?
        .install_recorder()?;

    Ok(handle)
}

/// Global handle if it can be installed, otherwise a detached one.
///
/// A second install fails (e.g. several routers built in one test binary);
/// the detached handle then renders an empty page.
pub fn metrics_handle() -> PrometheusHandle {
    setup_metrics().unwrap_or_else(|e| {
        tracing::debug!("Metrics recorder already installed, using detached handle: {}", e);
        PrometheusBuilder::new().build_recorder().handle()
    })
}

/// Refresh the provider gauges from the dispatcher's current view.
pub fn update_provider_gauges(dispatcher: &Dispatcher) {
    let report = dispatcher.provider_health_report();
    let routable = report
        .values()
        .filter(|s| s.enabled && s.tier.is_routable())
        .count();
    let open = report
        .values()
        .filter(|s| s.breaker.state != CircuitState::Closed)
        .count();

    metrics::gauge!("switchyard_providers_total").set(report.len() as f64);
    metrics::gauge!("switchyard_providers_routable").set(routable as f64);
    metrics::gauge!("switchyard_breakers_open").set(open as f64);
}
