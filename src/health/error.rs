//! Error types for health probing.

use crate::provider::ProviderError;
use thiserror::Error;

/// Why a probe did not produce a verdict.
#[derive(Debug, Clone, Error)]
pub enum HealthCheckError {
    #[error("probe timed out after {0}s")]
    Timeout(u64),

    #[error("probe failed: {0}")]
    Provider(#[from] ProviderError),
}
