//! Configuration for health checking.

use serde::{Deserialize, Serialize};

/// Largest rolling window a provider may keep.
pub const MAX_WINDOW_SIZE: usize = 100;

/// Background probing and rolling-window sizing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthCheckConfig {
    /// Whether the background probe loop runs
    pub enabled: bool,
    /// Seconds between probe rounds
    pub interval_seconds: u64,
    /// Timeout for each probe
    pub timeout_seconds: u64,
    /// Simultaneous outbound probes
    pub max_concurrent_probes: usize,
    /// Outcomes kept per provider, at most [`MAX_WINDOW_SIZE`]
    pub window_size: usize,
    /// Outcomes required before a provider's tier is trusted
    pub min_sample_size: u64,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_seconds: 30,
            timeout_seconds: 5,
            max_concurrent_probes: 10,
            window_size: 100,
            min_sample_size: 10,
        }
    }
}
