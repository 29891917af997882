//! Error types for provider calls.

use thiserror::Error;

/// Errors that can occur while talking to an upstream provider.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// Network connectivity error (DNS, connection refused, reset, ...).
    #[error("Network error: {0}")]
    Network(String),

    /// Request exceeded its deadline.
    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    /// Provider returned an error response (4xx, 5xx).
    #[error("Provider error {status}: {message}")]
    Upstream { status: u16, message: String },

    /// Operation not supported by this adapter.
    #[error("Operation '{0}' not supported by this provider")]
    Unsupported(&'static str),

    /// Response doesn't match the expected format.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Adapter configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ProviderError {
    /// Map a transport error, keeping timeouts distinct.
    pub(crate) fn from_reqwest(err: reqwest::Error, timeout_ms: u64) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout(timeout_ms)
        } else {
            ProviderError::Network(err.to_string())
        }
    }
}
