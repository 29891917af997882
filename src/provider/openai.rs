//! OpenAI-compatible HTTP adapter.

use super::{ProbeOutcome, Provider, ProviderError};
use crate::api::types::{ChatCompletionRequest, ChatCompletionResponse};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::{Duration, Instant};

const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// Adapter for any server speaking the OpenAI chat completions API.
///
/// - Health check via GET /v1/models
/// - Chat completion via POST /v1/chat/completions
/// - Optional Bearer token (required for the OpenAI cloud API)
pub struct OpenAICompatibleProvider {
    name: String,
    /// Base URL without trailing slash (e.g., "https://api.openai.com")
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
    /// Shared HTTP client for connection pooling
    client: Arc<Client>,
}

impl OpenAICompatibleProvider {
    pub fn new(
        name: String,
        base_url: String,
        api_key: Option<String>,
        timeout: Duration,
        client: Arc<Client>,
    ) -> Self {
        Self {
            name,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            timeout,
            client,
        }
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }
}

#[async_trait]
impl Provider for OpenAICompatibleProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn create_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, ProviderError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let timeout_ms = self.timeout.as_millis() as u64;

        let response = self
            .authorize(self.client.post(&url))
            .json(request)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, timeout_ms))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ProviderError::Upstream {
                status: status.as_u16(),
                message: error_body,
            });
        }

        response.json().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout(timeout_ms)
            } else {
                ProviderError::InvalidResponse(format!(
                    "Failed to parse completion response: {}",
                    e
                ))
            }
        })
    }

    async fn health_check(&self) -> Result<ProbeOutcome, ProviderError> {
        let url = format!("{}/v1/models", self.base_url);
        let started = Instant::now();

        let response = self
            .authorize(self.client.get(&url))
            .timeout(HEALTH_TIMEOUT)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, HEALTH_TIMEOUT.as_millis() as u64))?;

        Ok(ProbeOutcome {
            healthy: response.status().is_success(),
            latency: started.elapsed(),
        })
    }
}
