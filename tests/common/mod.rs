//! Shared test utilities for Switchyard integration tests.
//!
//! Provides a scripted provider whose outcomes are queued per call, counting
//! condensers, and builders for dispatchers and routers.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use switchyard::api::{
    create_router, AppState, ChatCompletionRequest, ChatCompletionResponse, ChatMessage, Choice,
};
use switchyard::config::SwitchyardConfig;
use switchyard::dispatch::Dispatcher;
use switchyard::provider::{CondenseError, Condenser, ProbeOutcome, Provider, ProviderError};
use switchyard::registry::{ProviderDescriptor, ProviderEntry, ProviderRegistry};

pub const MODEL: &str = "m";

// =============================================================================
// Scripted Provider
// =============================================================================

/// One scripted outcome of a `create_completion` call.
#[derive(Debug, Clone)]
pub enum Step {
    /// Succeed with this assistant text.
    Reply(String),
    /// Fail with this error.
    Fail(ProviderError),
    /// Never answer.
    Hang,
}

pub fn reply(text: &str) -> Step {
    Step::Reply(text.to_string())
}

pub fn upstream(status: u16, message: &str) -> Step {
    Step::Fail(ProviderError::Upstream {
        status,
        message: message.to_string(),
    })
}

pub fn server_error() -> Step {
    upstream(500, "internal error")
}

pub fn context_exceeded() -> Step {
    upstream(
        400,
        "This model's maximum context length is 8192 tokens (context_length_exceeded)",
    )
}

/// Provider that plays back queued steps, then repeats `otherwise`.
pub struct ScriptedProvider {
    name: String,
    script: Mutex<VecDeque<Step>>,
    otherwise: Step,
    healthy: AtomicBool,
    pub calls: AtomicUsize,
    pub probes: AtomicUsize,
    payloads: Mutex<Vec<ChatCompletionRequest>>,
}

impl ScriptedProvider {
    /// Provider that always succeeds, replying with its own name.
    pub fn healthy(name: &str) -> Self {
        Self::new(name, Vec::new(), reply(name))
    }

    /// Provider that always fails with `step`.
    pub fn failing(name: &str, step: Step) -> Self {
        Self::new(name, Vec::new(), step)
    }

    pub fn new(name: &str, script: Vec<Step>, otherwise: Step) -> Self {
        Self {
            name: name.to_string(),
            script: Mutex::new(script.into()),
            otherwise,
            healthy: AtomicBool::new(true),
            calls: AtomicUsize::new(0),
            probes: AtomicUsize::new(0),
            payloads: Mutex::new(Vec::new()),
        }
    }

    pub fn set_probe_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Payloads received, in call order.
    pub fn payloads(&self) -> Vec<ChatCompletionRequest> {
        self.payloads.lock().clone()
    }
}

pub fn response(model: &str, text: &str) -> ChatCompletionResponse {
    ChatCompletionResponse {
        id: "chatcmpl-test".to_string(),
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
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn create_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.payloads.lock().push(request.clone());
        let step = self
            .script
            .lock()
            .pop_front()
            .unwrap_or_else(|| self.otherwise.clone());
        match step {
            Step::Reply(text) => Ok(response(&request.model, &text)),
            Step::Fail(e) => Err(e),
            Step::Hang => std::future::pending().await,
        }
    }

    async fn health_check(&self) -> Result<ProbeOutcome, ProviderError> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        Ok(ProbeOutcome {
            healthy: self.healthy.load(Ordering::SeqCst),
            latency: Duration::from_millis(25),
        })
    }
}

// =============================================================================
// Condensers
// =============================================================================

/// Condenser that returns a fixed summary and counts its invocations.
pub struct CountingCondenser {
    summary: Option<String>,
    pub calls: AtomicUsize,
    inputs: Mutex<Vec<Vec<String>>>,
}

impl CountingCondenser {
    pub fn ok(summary: &str) -> Self {
        Self {
            summary: Some(summary.to_string()),
            calls: AtomicUsize::new(0),
            inputs: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            summary: None,
            calls: AtomicUsize::new(0),
            inputs: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn inputs(&self) -> Vec<Vec<String>> {
        self.inputs.lock().clone()
    }
}

#[async_trait]
impl Condenser for CountingCondenser {
    async fn condense(&self, content: &[String], _max_tokens: u32) -> Result<String, CondenseError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inputs.lock().push(content.to_vec());
        self.summary.clone().ok_or(CondenseError::AllFailed {
            attempts: 1,
            last: "condenser offline".to_string(),
        })
    }
}

// =============================================================================
// Builders
// =============================================================================

/// Config with millisecond backoff so paused-clock tests stay short.
pub fn test_config() -> SwitchyardConfig {
    let mut config = SwitchyardConfig::default();
    config.retry.base_delay_ms = 100;
    config.retry.max_delay_ms = 1000;
    config
}

pub fn entry(provider: &Arc<ScriptedProvider>, priority: i32) -> ProviderEntry {
    let name = provider.name().to_string();
    ProviderEntry::new(
        ProviderDescriptor::new(&name, format!("http://{}.test", name), &[MODEL])
            .with_priority(priority),
        Arc::clone(provider) as Arc<dyn Provider>,
    )
}

pub fn entry_with(
    provider: &Arc<ScriptedProvider>,
    configure: impl FnOnce(&mut ProviderDescriptor),
) -> ProviderEntry {
    let name = provider.name().to_string();
    let mut descriptor = ProviderDescriptor::new(&name, format!("http://{}.test", name), &[MODEL]);
    configure(&mut descriptor);
    ProviderEntry::new(descriptor, Arc::clone(provider) as Arc<dyn Provider>)
}

pub fn dispatcher(entries: Vec<ProviderEntry>, config: &SwitchyardConfig) -> Dispatcher {
    let registry = Arc::new(ProviderRegistry::new(entries).expect("unique provider names"));
    Dispatcher::new(registry, config)
}

pub fn user_request(text: &str) -> ChatCompletionRequest {
    ChatCompletionRequest::new(MODEL, vec![ChatMessage::text("user", text)])
}

/// Long conversation whose middle turns get folded by remediation.
pub fn long_conversation() -> ChatCompletionRequest {
    let mut messages = vec![ChatMessage::text("system", "You are terse.")];
    for i in 0..6 {
        messages.push(ChatMessage::text("user", format!("question {} {}", i, "x".repeat(500))));
        messages.push(ChatMessage::text("assistant", format!("answer {} {}", i, "y".repeat(500))));
    }
    messages.push(ChatMessage::text("user", "final question"));
    ChatCompletionRequest::new(MODEL, messages)
}

/// Router over `dispatcher` with `config`.
pub fn make_app(dispatcher: Arc<Dispatcher>, config: SwitchyardConfig) -> axum::Router {
    let state = AppState::new(dispatcher, Arc::new(config), Arc::new(reqwest::Client::new()));
    create_router(Arc::new(state))
}

pub fn make_app_with_state(state: AppState) -> axum::Router {
    create_router(Arc::new(state))
}
