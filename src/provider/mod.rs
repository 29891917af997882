//! Provider capability.
//!
//! Every upstream vendor adapter implements [`Provider`]. The dispatch core
//! only ever sees the trait object; adapters are chosen by the factory from
//! the configured [`ProviderType`](crate::registry::ProviderType).

pub mod condenser;
mod error;
pub mod factory;
pub mod openai;
#[cfg(test)]
pub(crate) mod testing;

pub use condenser::{CondenseError, Condenser, RacingCondenser};
pub use error::ProviderError;
pub use factory::{build_entries, create_provider};
pub use openai::OpenAICompatibleProvider;

use crate::api::types::{ChatCompletionRequest, ChatCompletionResponse};
use async_trait::async_trait;
use std::time::Duration;

/// Result of a single health probe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeOutcome {
    pub healthy: bool,
    pub latency: Duration,
}

/// An upstream LLM backend.
///
/// Cancellation is by drop: abandoning the returned future aborts the
/// in-flight HTTP call.
#[async_trait]
pub trait Provider: Send + Sync + 'static {
    /// Provider name, matching its descriptor.
    fn name(&self) -> &str;

    /// Send one non-streaming chat completion.
    async fn create_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, ProviderError>;

    /// Lightweight liveness probe.
    async fn health_check(&self) -> Result<ProbeOutcome, ProviderError>;
}
