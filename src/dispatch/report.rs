use crate::health::{HealthTier, MetricsSnapshot};
use crate::resilience::BreakerSnapshot;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Read-only view of one provider for the status surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderStatus {
    pub tier: HealthTier,
    pub metrics: MetricsSnapshot,
    pub breaker: BreakerSnapshot,
    pub enabled: bool,
    pub priority: i32,
    pub models: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_limit_remaining: Option<u32>,
}

/// Provider name -> status, sorted by name.
pub type ProviderHealthReport = BTreeMap<String, ProviderStatus>;
