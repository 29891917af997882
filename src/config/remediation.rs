//! Oversized-context remediation configuration

use serde::{Deserialize, Serialize};

/// Controls the one-shot condensation applied when a provider rejects a
/// request for exceeding its context window.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemediationConfig {
    pub enabled: bool,
    /// Model whose providers perform the summarization. Without one,
    /// remediation is skipped and the error is handled like any other.
    pub condenser_model: Option<String>,
    /// Token budget handed to the condenser for the summary.
    pub summary_max_tokens: u32,
}

impl Default for RemediationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            condenser_model: None,
            summary_max_tokens: 1024,
        }
    }
}
