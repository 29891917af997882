use crate::config::ProviderConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;

/// Wire protocol spoken by an upstream provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    /// OpenAI cloud API, bearer token required
    OpenAI,
    /// Any OpenAI-compatible server (vLLM, llama.cpp, LiteLLM, ...)
    #[default]
    Generic,
}

impl std::fmt::Display for ProviderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderType::OpenAI => write!(f, "openai"),
            ProviderType::Generic => write!(f, "generic"),
        }
    }
}

/// Immutable description of one configured provider.
///
/// Descriptors are built once from configuration and replaced wholesale on
/// reload; nothing mutates them in place.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderDescriptor {
    pub name: String,
    pub base_url: String,
    pub provider_type: ProviderType,
    pub models: BTreeSet<String>,
    /// Lower is preferred.
    pub priority: i32,
    pub enabled: bool,
    pub rate_limit_rpm: Option<u32>,
    pub max_retries: Option<u32>,
    pub retry_delay: Option<Duration>,
    /// Per-attempt timeout.
    pub timeout: Duration,
}

impl ProviderDescriptor {
    /// Minimal enabled descriptor with default priority and timeout.
    pub fn new(name: impl Into<String>, base_url: impl Into<String>, models: &[&str]) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            provider_type: ProviderType::Generic,
            models: models.iter().map(|m| m.to_string()).collect(),
            priority: 50,
            enabled: true,
            rate_limit_rpm: None,
            max_retries: None,
            retry_delay: None,
            timeout: Duration::from_secs(60),
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn serves(&self, model: &str) -> bool {
        self.models.contains(model)
    }
}

impl From<&ProviderConfig> for ProviderDescriptor {
    fn from(config: &ProviderConfig) -> Self {
        Self {
            name: config.name.clone(),
            base_url: config.url.trim_end_matches('/').to_string(),
            provider_type: config.provider_type,
            models: config.models.iter().cloned().collect(),
            priority: config.priority,
            enabled: config.enabled,
            rate_limit_rpm: config.rate_limit_rpm,
            max_retries: config.max_retries,
            retry_delay: config.retry_delay_ms.map(Duration::from_millis),
            timeout: Duration::from_secs(config.timeout_seconds),
        }
    }
}

/// Serializable view of a descriptor for the CLI and the HTTP surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderView {
    pub name: String,
    pub url: String,
    #[serde(rename = "type")]
    pub provider_type: ProviderType,
    pub models: Vec<String>,
    pub priority: i32,
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_limit_rpm: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_delay_ms: Option<u64>,
    pub timeout_seconds: u64,
}

impl From<&ProviderDescriptor> for ProviderView {
    fn from(descriptor: &ProviderDescriptor) -> Self {
        Self {
            name: descriptor.name.clone(),
            url: descriptor.base_url.clone(),
            provider_type: descriptor.provider_type,
            models: descriptor.models.iter().cloned().collect(),
            priority: descriptor.priority,
            enabled: descriptor.enabled,
            rate_limit_rpm: descriptor.rate_limit_rpm,
            max_retries: descriptor.max_retries,
            retry_delay_ms: descriptor.retry_delay.map(|d| d.as_millis() as u64),
            timeout_seconds: descriptor.timeout.as_secs(),
        }
    }
}
