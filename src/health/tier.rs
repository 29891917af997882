//! Discrete health tiers and candidate ordering.

use super::metrics::ProviderMetrics;
use serde::{Deserialize, Serialize};

/// Health band of a provider, computed on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthTier {
    Excellent,
    Good,
    Fair,
    Poor,
    Unhealthy,
}

impl HealthTier {
    /// Classify a provider's window.
    ///
    /// Fewer than `min_sample_size` lifetime outcomes reads as Unhealthy.
    pub fn from_metrics(metrics: &ProviderMetrics, min_sample_size: u64) -> Self {
        let total = metrics.total_requests();
        if total == 0 || total < min_sample_size {
            return HealthTier::Unhealthy;
        }
        Self::from_measurements(metrics.average_latency_ms(), metrics.error_rate() * 100.0)
    }

    pub fn from_measurements(avg_latency_ms: f64, error_rate_pct: f64) -> Self {
        if avg_latency_ms < 100.0 && error_rate_pct < 0.1 {
            HealthTier::Excellent
        } else if avg_latency_ms < 300.0 && error_rate_pct < 1.0 {
            HealthTier::Good
        } else if avg_latency_ms < 500.0 && error_rate_pct < 5.0 {
            HealthTier::Fair
        } else if avg_latency_ms < 1000.0 && error_rate_pct < 10.0 {
            HealthTier::Poor
        } else {
            HealthTier::Unhealthy
        }
    }

    /// Tiers eligible for ranked dispatch.
    pub fn is_routable(self) -> bool {
        matches!(self, HealthTier::Excellent | HealthTier::Good | HealthTier::Fair)
    }
}

impl std::fmt::Display for HealthTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            HealthTier::Excellent => "excellent",
            HealthTier::Good => "good",
            HealthTier::Fair => "fair",
            HealthTier::Poor => "poor",
            HealthTier::Unhealthy => "unhealthy",
        };
        f.write_str(s)
    }
}

/// Ordering applied to healthy candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankOrder {
    /// Configured priority first, performance score breaks ties.
    #[default]
    Priority,
    /// Performance score only.
    Score,
}
