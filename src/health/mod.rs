//! Provider health monitoring.
//!
//! [`HealthMonitor`] keeps a rolling window of outcomes per provider, fed by
//! live dispatch traffic and by the background [`HealthChecker`], and ranks
//! candidates for a model from it.

mod checker;
mod config;
mod error;
mod metrics;
mod tier;


pub use checker::*;
pub use config::*;
pub use error::*;
pub use metrics::*;
pub use tier::*;

use crate::registry::ProviderEntry;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::cmp::Ordering;
use std::sync::Arc;

/// Shared, per-provider performance tracker.
///
/// Each provider's window sits behind its own lock, so outcomes for one
/// provider never wait on another's.
pub struct HealthMonitor {
    metrics: DashMap<String, Arc<Mutex<ProviderMetrics>>>,
    window_size: usize,
    min_sample_size: u64,
}

impl HealthMonitor {
    /// `window_size` is clamped to `1..=MAX_WINDOW_SIZE`.
    pub fn new(window_size: usize, min_sample_size: u64) -> Self {
        Self {
            metrics: DashMap::new(),
            window_size: window_size.clamp(1, MAX_WINDOW_SIZE),
            min_sample_size,
        }
    }

    pub fn from_config(config: &HealthCheckConfig) -> Self {
        Self::new(config.window_size, config.min_sample_size)
    }

    fn entry(&self, provider: &str) -> Arc<Mutex<ProviderMetrics>> {
        if let Some(existing) = self.metrics.get(provider) {
            return Arc::clone(existing.value());
        }
        let window_size = self.window_size;
        self.metrics
            .entry(provider.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(ProviderMetrics::new(window_size))))
            .value()
            .clone()
    }

    /// Append one outcome to the provider's window.
    pub fn record_outcome(&self, provider: &str, success: bool, latency_ms: f64) {
        self.entry(provider).lock().record(success, latency_ms);
    }

    pub fn health_tier(&self, provider: &str) -> HealthTier {
        match self.metrics.get(provider) {
            Some(m) => HealthTier::from_metrics(&m.lock(), self.min_sample_size),
            None => HealthTier::Unhealthy,
        }
    }

    /// Whether enough outcomes exist for the tier to mean anything.
    pub fn has_evidence(&self, provider: &str) -> bool {
        self.metrics
            .get(provider)
            .map(|m| m.lock().total_requests() >= self.min_sample_size.max(1))
            .unwrap_or(false)
    }

    pub fn performance_score(&self, provider: &str) -> Option<f64> {
        self.metrics
            .get(provider)
            .map(|m| m.lock().performance_score())
    }

    pub fn snapshot(&self, provider: &str) -> Option<MetricsSnapshot> {
        self.metrics.get(provider).map(|m| m.lock().snapshot())
    }

    /// Clear a provider's window and totals. Returns whether it was tracked.
    pub fn reset(&self, provider: &str) -> bool {
        match self.metrics.get(provider) {
            Some(m) => {
                *m.lock() = ProviderMetrics::new(self.window_size);
                true
            }
            None => false,
        }
    }

    /// Order `candidates` for dispatch.
    ///
    /// Providers in the Excellent, Good or Fair tier come first, sorted by
    /// `order`. Providers without enough evidence follow in their input order.
    /// Providers with enough evidence in the Poor or Unhealthy tier are
    /// dropped. The result may be empty.
    pub fn rank_providers_for_model(
        &self,
        model: &str,
        candidates: &[ProviderEntry],
        order: RankOrder,
    ) -> Vec<ProviderEntry> {
        let mut healthy: Vec<(f64, &ProviderEntry)> = Vec::new();
        let mut unproven: Vec<&ProviderEntry> = Vec::new();

        for entry in candidates {
            let name = entry.name();
            if !self.has_evidence(name) {
                unproven.push(entry);
                continue;
            }
            let tier = self.health_tier(name);
            if tier.is_routable() {
                let score = self.performance_score(name).unwrap_or(f64::MAX);
                healthy.push((score, entry));
            } else {
                tracing::debug!(provider = %name, model, %tier, "Excluded from ranking");
            }
        }

        let by_score = |a: f64, b: f64| a.partial_cmp(&b).unwrap_or(Ordering::Equal);
        match order {
            RankOrder::Priority => healthy.sort_by(|(sa, a), (sb, b)| {
                a.descriptor
                    .priority
                    .cmp(&b.descriptor.priority)
                    .then_with(|| by_score(*sa, *sb))
            }),
            RankOrder::Score => healthy.sort_by(|(sa, _), (sb, _)| by_score(*sa, *sb)),
        }

        healthy
            .into_iter()
            .map(|(_, e)| e)
            .chain(unproven)
            .cloned()
            .collect()
    }

    /// Names of every provider with recorded metrics.
    pub fn tracked_providers(&self) -> Vec<String> {
        self.metrics.iter().map(|e| e.key().clone()).collect()
    }
}

impl Default for HealthMonitor {
    fn default() -> Self {
        Self::from_config(&HealthCheckConfig::default())
    }
}
