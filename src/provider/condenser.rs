//! Condenser capability.
//!
//! Shrinks an oversized conversation into a short summary so a request that
//! blew a provider's context window can be retried.

use super::ProviderError;
use crate::api::types::{ChatCompletionRequest, ChatMessage};
use crate::registry::ProviderRegistry;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinSet;

const SUMMARY_PROMPT: &str = "Summarize the following conversation excerpt. Keep every fact, \
decision, identifier and open question needed to continue it. Reply with the summary only.";

/// Errors produced while condensing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CondenseError {
    #[error("no provider serves condenser model '{0}'")]
    NoProviders(String),

    #[error("all {attempts} condenser calls failed, last error: {last}")]
    AllFailed { attempts: usize, last: String },

    #[error("nothing to condense")]
    EmptyInput,
}

/// Summarizes content within a token budget.
#[async_trait]
pub trait Condenser: Send + Sync {
    async fn condense(&self, content: &[String], max_tokens: u32) -> Result<String, CondenseError>;
}

/// Races one summarization request across every provider serving the
/// condenser model and keeps the first usable answer.
///
/// Losing calls are aborted as soon as a winner arrives. Dropping the future
/// returned by [`Condenser::condense`] aborts all of them.
pub struct RacingCondenser {
    registry: Arc<ProviderRegistry>,
    model: String,
}

impl RacingCondenser {
    pub fn new(registry: Arc<ProviderRegistry>, model: impl Into<String>) -> Self {
        Self {
            registry,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn summary_request(&self, content: &[String], max_tokens: u32) -> ChatCompletionRequest {
        let mut request = ChatCompletionRequest::new(
            self.model.clone(),
            vec![
                ChatMessage::text("system", SUMMARY_PROMPT),
                ChatMessage::text("user", content.join("\n\n")),
            ],
        );
        request.max_tokens = Some(max_tokens);
        request.temperature = Some(0.0);
        request
    }
}

#[async_trait]
impl Condenser for RacingCondenser {
    async fn condense(&self, content: &[String], max_tokens: u32) -> Result<String, CondenseError> {
        if content.iter().all(|c| c.trim().is_empty()) {
            return Err(CondenseError::EmptyInput);
        }

        let candidates = self.registry.providers_for_model(&self.model);
        if candidates.is_empty() {
            return Err(CondenseError::NoProviders(self.model.clone()));
        }

        let request = Arc::new(self.summary_request(content, max_tokens));
        let mut racers = JoinSet::new();
        for entry in &candidates {
            let provider = Arc::clone(&entry.provider);
            let request = Arc::clone(&request);
            racers.spawn(async move {
                let name = provider.name().to_string();
                let result = provider.create_completion(&request).await;
                (name, result)
            });
        }

        let attempts = candidates.len();
        let mut last = String::from("no result");
        while let Some(joined) = racers.join_next().await {
            match joined {
                Ok((name, Ok(response))) => match response.first_text() {
                    Some(text) if !text.trim().is_empty() => {
                        racers.abort_all();
                        tracing::debug!(provider = %name, model = %self.model, "Condenser race won");
                        return Ok(text);
                    }
                    _ => {
                        last = ProviderError::InvalidResponse(format!(
                            "empty summary from '{}'",
                            name
                        ))
                        .to_string();
                    }
                },
                Ok((name, Err(e))) => {
                    tracing::debug!(provider = %name, error = %e, "Condenser call failed");
                    last = e.to_string();
                }
                Err(e) => {
                    last = e.to_string();
                }
            }
        }

        Err(CondenseError::AllFailed { attempts, last })
    }
}
