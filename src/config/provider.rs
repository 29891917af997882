//! Upstream provider configuration

use crate::registry::ProviderType;
use serde::{Deserialize, Serialize};

/// One `[[providers]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub name: String,
    pub url: String,
    #[serde(rename = "type", default)]
    pub provider_type: ProviderType,
    #[serde(default)]
    pub models: Vec<String>,
    #[serde(default = "default_priority")]
    pub priority: i32,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Environment variable holding the bearer token for this provider.
    #[serde(default)]
    pub api_key_env: Option<String>,
    /// Per-attempt timeout.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    /// Overrides `retry.max_attempts` for this provider.
    #[serde(default)]
    pub max_retries: Option<u32>,
    /// Overrides `retry.base_delay_ms` for this provider.
    #[serde(default)]
    pub retry_delay_ms: Option<u64>,
    /// Requests per minute this proxy may send to the provider.
    #[serde(default)]
    pub rate_limit_rpm: Option<u32>,
}

fn default_priority() -> i32 {
    50
}

fn default_enabled() -> bool {
    true
}

fn default_timeout_seconds() -> u64 {
    60
}
