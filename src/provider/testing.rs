//! Stub provider shared by unit tests.

use super::{ProbeOutcome, Provider, ProviderError};
use crate::api::types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, Choice};
use crate::registry::{ProviderDescriptor, ProviderEntry};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub(crate) struct StubProvider {
    name: String,
    healthy: Mutex<Result<bool, ProviderError>>,
    probe_delay: Duration,
    pub(crate) completions: AtomicUsize,
    pub(crate) probes: AtomicUsize,
}

impl StubProvider {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            healthy: Mutex::new(Ok(true)),
            probe_delay: Duration::ZERO,
            completions: AtomicUsize::new(0),
            probes: AtomicUsize::new(0),
        }
    }

    pub(crate) fn with_probe(self, result: Result<bool, ProviderError>) -> Self {
        *self.healthy.lock() = result;
        self
    }

    pub(crate) fn with_probe_delay(mut self, delay: Duration) -> Self {
        self.probe_delay = delay;
        self
    }
}

pub(crate) fn reply(model: &str, text: &str) -> ChatCompletionResponse {
    ChatCompletionResponse {
        id: "chatcmpl-stub".to_string(),
        object: "chat.completion".to_string(),
        created: 0,
        model: model.to_string(),
        choices: vec![Choice {
            index: 0,
            message: ChatMessage::text("assistant", text),
            finish_reason: Some("stop".to_string()),
        }],
        usage: None,
    }
}

#[async_trait]
impl Provider for StubProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn create_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, ProviderError> {
        self.completions.fetch_add(1, Ordering::SeqCst);
        Ok(reply(&request.model, &self.name))
    }

    async fn health_check(&self) -> Result<ProbeOutcome, ProviderError> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        if !self.probe_delay.is_zero() {
            tokio::time::sleep(self.probe_delay).await;
        }
        let healthy = self.healthy.lock().clone()?;
        Ok(ProbeOutcome {
            healthy,
            latency: Duration::from_millis(20),
        })
    }
}

/// Entry serving `models` at `priority`, backed by a fresh stub.
pub(crate) fn stub_entry(name: &str, priority: i32, models: &[&str]) -> ProviderEntry {
    ProviderEntry::new(
        ProviderDescriptor::new(name, format!("http://{}.invalid", name), models)
            .with_priority(priority),
        Arc::new(StubProvider::new(name)),
    )
}
