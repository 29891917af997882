//! Switchyard - resilient dispatch proxy for OpenAI-compatible LLM providers
//!
//! Each request is walked over the providers serving its model in health-ranked
//! order. Every provider sits behind its own circuit breaker; failures are
//! classified once and retried with backoff only when transient; an
//! oversized-context failure triggers a one-shot condensation of the
//! conversation before the next attempt.
//!
//! ```no_run
//! use switchyard::api::ChatCompletionRequest;
//! use switchyard::config::SwitchyardConfig;
//! use switchyard::dispatch::Dispatcher;
//! use switchyard::provider::build_entries;
//! use switchyard::registry::ProviderRegistry;
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SwitchyardConfig::load(Some("switchyard.toml".as_ref()))?;
//! let entries = build_entries(&config.providers, Arc::new(reqwest::Client::new()))?;
//! let dispatcher = Dispatcher::new(Arc::new(ProviderRegistry::new(entries)?), &config);
//!
//! let request: ChatCompletionRequest = serde_json::from_str(
//!     r#"{"model": "llama3", "messages": [{"role": "user", "content": "hi"}]}"#,
//! )?;
//! let response = dispatcher
//!     .dispatch("llama3", request, &CancellationToken::new())
//!     .await?;
//! println!("{:?}", response.first_text());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod health;
pub mod logging;
pub mod metrics;
pub mod provider;
pub mod registry;
pub mod resilience;
