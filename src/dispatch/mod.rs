//! Resilient dispatch.
//!
//! [`Dispatcher`] turns one request into an ordered walk over the providers
//! serving its model: breaker gate, per-provider attempt loop with classified
//! retries, one-shot context remediation, then fallback to the next
//! candidate. Every outcome feeds the provider's breaker and health window.

mod attempt;
mod error;
pub mod remediation;
mod report;

pub use attempt::DispatchAttempt;
pub use error::DispatchError;
pub use report::{ProviderHealthReport, ProviderStatus};

use crate::api::types::{ChatCompletionRequest, ChatCompletionResponse};
use crate::config::{RemediationConfig, SwitchyardConfig};
use crate::health::{HealthChecker, HealthMonitor, RankOrder};
use crate::provider::{Condenser, ProviderError, RacingCondenser};
use crate::registry::{ProviderEntry, ProviderRegistry, RegistryError};
use crate::resilience::{
    BreakerSnapshot, CircuitBreaker, CircuitBreakerConfig, CircuitState, ErrorClass, RateLimiter,
    RetryConfig, RetryStrategy,
};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// The dispatch core. Construct once and share behind an `Arc`.
pub struct Dispatcher {
    registry: Arc<ProviderRegistry>,
    monitor: Arc<HealthMonitor>,
    checker: Arc<HealthChecker>,
    breakers: DashMap<String, Arc<CircuitBreaker>>,
    breaker_config: CircuitBreakerConfig,
    limiters: DashMap<String, Arc<RateLimiter>>,
    retry: Arc<dyn RetryStrategy>,
    retry_config: RetryConfig,
    rank_order: RankOrder,
    remediation: RemediationConfig,
    condenser: Option<Arc<dyn Condenser>>,
}

/// How one provider's attempt loop ended without a response.
enum LoopEnd {
    Exhausted,
    Cancelled,
}

impl Dispatcher {
    pub fn new(registry: Arc<ProviderRegistry>, config: &SwitchyardConfig) -> Self {
        let monitor = Arc::new(HealthMonitor::from_config(&config.health_check));
        let checker = Arc::new(HealthChecker::new(
            Arc::clone(&registry),
            Arc::clone(&monitor),
            config.health_check.clone(),
        ));

        let condenser: Option<Arc<dyn Condenser>> = match &config.remediation.condenser_model {
            Some(model) if config.remediation.enabled => Some(Arc::new(RacingCondenser::new(
                Arc::clone(&registry),
                model.clone(),
            ))),
            _ => None,
        };

        let dispatcher = Self {
            registry,
            monitor,
            checker,
            breakers: DashMap::new(),
            breaker_config: config.circuit_breaker.clone(),
            limiters: DashMap::new(),
            retry: config.retry.strategy(),
            retry_config: config.retry.clone(),
            rank_order: config.routing.order,
            remediation: config.remediation.clone(),
            condenser,
        };
        dispatcher.sync_provider_state();
        dispatcher
    }

    /// Replace the condenser used for remediation.
    pub fn with_condenser(mut self, condenser: Arc<dyn Condenser>) -> Self {
        self.condenser = Some(condenser);
        self
    }

    /// Replace the retry strategy selected from configuration.
    pub fn with_retry_strategy(mut self, strategy: Arc<dyn RetryStrategy>) -> Self {
        self.retry = strategy;
        self
    }

    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    pub fn monitor(&self) -> &Arc<HealthMonitor> {
        &self.monitor
    }

    pub fn checker(&self) -> &Arc<HealthChecker> {
        &self.checker
    }

    /// Breaker for `provider`, created closed on first use.
    pub fn breaker(&self, provider: &str) -> Arc<CircuitBreaker> {
        if let Some(existing) = self.breakers.get(provider) {
            return Arc::clone(existing.value());
        }
        self.breakers
            .entry(provider.to_string())
            .or_insert_with(|| {
                Arc::new(CircuitBreaker::from_config(provider, &self.breaker_config))
            })
            .value()
            .clone()
    }

    /// Create breakers for new providers and align rate limiters with the
    /// current descriptors. Existing breakers and metrics persist.
    fn sync_provider_state(&self) {
        let table = self.registry.snapshot();
        for entry in table.entries() {
            let descriptor = &entry.descriptor;
            if descriptor.enabled {
                self.breaker(&descriptor.name);
            }
            match descriptor.rate_limit_rpm {
                Some(rpm) => {
                    let stale = self
                        .limiters
                        .get(&descriptor.name)
                        .map(|l| l.limit() != rpm)
                        .unwrap_or(true);
                    if stale {
                        self.limiters
                            .insert(descriptor.name.clone(), Arc::new(RateLimiter::per_minute(rpm)));
                    }
                }
                None => {
                    self.limiters.remove(&descriptor.name);
                }
            }
        }
        self.limiters.retain(|name, _| table.get(name).is_some());
    }

    /// Swap in a new provider catalog.
    pub fn reload(&self, entries: Vec<ProviderEntry>) -> Result<(), RegistryError> {
        let count = entries.len();
        self.registry.replace(entries)?;
        self.sync_provider_state();
        tracing::info!(providers = count, "Provider catalog reloaded");
        Ok(())
    }

    /// Force a provider's breaker closed.
    pub fn reset_circuit_breaker(&self, provider: &str) -> Result<(), RegistryError> {
        self.registry.get(provider)?;
        if let Some(breaker) = self.breakers.get(provider) {
            breaker.reset();
        }
        Ok(())
    }

    /// Clear a provider's health window.
    pub fn reset_metrics(&self, provider: &str) -> Result<(), RegistryError> {
        self.registry.get(provider)?;
        self.monitor.reset(provider);
        Ok(())
    }

    /// Snapshot of every configured provider's tier, metrics and breaker.
    pub fn provider_health_report(&self) -> ProviderHealthReport {
        self.registry
            .all_providers()
            .into_iter()
            .map(|descriptor| {
                let name = descriptor.name.clone();
                let status = ProviderStatus {
                    tier: self.monitor.health_tier(&name),
                    metrics: self
                        .monitor
                        .snapshot(&name)
                        .unwrap_or_else(crate::health::MetricsSnapshot::empty),
                    breaker: self
                        .breakers
                        .get(&name)
                        .map(|b| b.snapshot())
                        .unwrap_or_else(|| {
                            BreakerSnapshot::closed(self.breaker_config.failure_threshold)
                        }),
                    enabled: descriptor.enabled,
                    priority: descriptor.priority,
                    models: descriptor.models.iter().cloned().collect(),
                    rate_limit_remaining: self.limiters.get(&name).map(|l| l.remaining()),
                };
                (name, status)
            })
            .collect()
    }

    /// Run one off-cycle probe round and report the result.
    pub async fn trigger_health_check(&self) -> ProviderHealthReport {
        self.checker.check_all_providers().await;
        self.provider_health_report()
    }

    /// Dispatch one request for `model`.
    ///
    /// Returns the first successful response, or the terminal error once
    /// every candidate is exhausted. Cancelling `cancel` aborts the in-flight
    /// attempt, skips any pending backoff and returns [`DispatchError::Cancelled`].
    pub async fn dispatch(
        &self,
        model: &str,
        payload: ChatCompletionRequest,
        cancel: &CancellationToken,
    ) -> Result<ChatCompletionResponse, DispatchError> {
        let result = self.run(model, payload, cancel).await;
        let outcome = match &result {
            Ok(_) => "success",
            Err(e) => e.outcome(),
        };
        metrics::counter!("switchyard_dispatch_total",
            "model" => model.to_string(),
            "outcome" => outcome
        )
        .increment(1);
        result
    }

    async fn run(
        &self,
        model: &str,
        payload: ChatCompletionRequest,
        cancel: &CancellationToken,
    ) -> Result<ChatCompletionResponse, DispatchError> {
        if cancel.is_cancelled() {
            return Err(DispatchError::Cancelled);
        }

        let table = self.registry.snapshot();
        let candidates = table.providers_for_model(model);
        if candidates.is_empty() {
            tracing::debug!(model, "No provider serves model");
            return Err(DispatchError::UnsupportedModel {
                model: model.to_string(),
            });
        }

        // Ranked once; the order stays fixed for this dispatch.
        let mut ranked = self
            .monitor
            .rank_providers_for_model(model, &candidates, self.rank_order);
        if ranked.is_empty() {
            tracing::warn!(
                model,
                candidates = candidates.len(),
                "No healthy provider, trying all candidates in priority order"
            );
            ranked = candidates;
        }

        let mut state = DispatchState {
            payload,
            remediated: false,
            attempts: Vec::new(),
        };
        let mut previous: Option<String> = None;

        for entry in &ranked {
            let name = entry.name();
            let breaker = self.breaker(name);
            if !breaker.can_attempt() {
                tracing::debug!(provider = %name, model, "Circuit open, skipping provider");
                continue;
            }
            if let Some(limiter) = self.limiter(name) {
                if limiter.remaining() == 0 {
                    tracing::info!(
                        provider = %name,
                        model,
                        limit_rpm = limiter.limit(),
                        "Rate limit reached, skipping provider"
                    );
                    continue;
                }
            }

            if let Some(from) = previous.as_deref() {
                tracing::info!(from = %from, to = %name, model, "Falling back to next provider");
                metrics::counter!("switchyard_fallbacks_total", "provider" => name.to_string())
                    .increment(1);
            }
            previous = Some(name.to_string());

            match self.attempt_provider(entry, &breaker, &mut state, cancel).await {
                Ok(response) => return Ok(response),
                Err(LoopEnd::Cancelled) => {
                    tracing::debug!(provider = %name, model, "Dispatch cancelled");
                    return Err(DispatchError::Cancelled);
                }
                Err(LoopEnd::Exhausted) => {}
            }
        }

        tracing::warn!(
            model,
            attempts = state.attempts.len(),
            "All providers unavailable"
        );
        Err(DispatchError::AllProvidersUnavailable {
            model: model.to_string(),
            attempts: state.attempts,
        })
    }

    /// Attempt loop against a single provider.
    async fn attempt_provider(
        &self,
        entry: &ProviderEntry,
        breaker: &CircuitBreaker,
        state: &mut DispatchState,
        cancel: &CancellationToken,
    ) -> Result<ChatCompletionResponse, LoopEnd> {
        let descriptor = &entry.descriptor;
        let name = descriptor.name.as_str();
        let max_attempts = descriptor
            .max_retries
            .unwrap_or(self.retry_config.max_attempts)
            .max(1);
        let base_delay = descriptor
            .retry_delay
            .unwrap_or_else(|| self.retry_config.base_delay());
        let max_delay = self.retry_config.max_delay();

        let limiter = self.limiter(name);
        let mut attempt = 1u32;
        let mut retry = 0u32;
        let mut delay_before = Duration::ZERO;
        // Raised past `max_attempts` so a condensed payload is always tried once.
        let mut budget = max_attempts;

        while attempt <= budget {
            // Every upstream call takes a permit, retries included.
            if let Some(limiter) = &limiter {
                if !limiter.try_acquire() {
                    tracing::info!(
                        provider = %name,
                        attempt,
                        limit_rpm = limiter.limit(),
                        "Rate limit reached mid-dispatch, leaving provider"
                    );
                    break;
                }
            }

            let started = Instant::now();
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(LoopEnd::Cancelled),
                r = tokio::time::timeout(descriptor.timeout, entry.provider.create_completion(&state.payload)) => r,
            };
            let elapsed = started.elapsed();
            let latency_ms = elapsed.as_secs_f64() * 1000.0;
            let result = result
                .unwrap_or_else(|_| Err(ProviderError::Timeout(descriptor.timeout.as_millis() as u64)));

            metrics::histogram!("switchyard_attempt_latency_seconds", "provider" => name.to_string())
                .record(elapsed.as_secs_f64());

            let error = match result {
                Ok(response) => {
                    breaker.record_success();
                    self.monitor.record_outcome(name, true, latency_ms);
                    self.retry.record_outcome(name, true, delay_before);
                    state.record(name, attempt, None, delay_before, latency_ms);
                    metrics::counter!("switchyard_attempts_total",
                        "provider" => name.to_string(),
                        "outcome" => "success"
                    )
                    .increment(1);
                    tracing::debug!(provider = %name, attempt, latency_ms, "Attempt succeeded");
                    return Ok(response);
                }
                Err(e) => e,
            };

            let mut class = ErrorClass::classify(&error);
            breaker.record_failure();
            self.monitor.record_outcome(name, false, latency_ms);
            self.retry.record_outcome(name, false, delay_before);
            state.record(name, attempt, Some(class), delay_before, latency_ms);
            metrics::counter!("switchyard_attempts_total",
                "provider" => name.to_string(),
                "outcome" => class.as_str()
            )
            .increment(1);
            tracing::debug!(
                provider = %name,
                attempt,
                error_class = %class,
                latency_ms,
                error = %error,
                "Attempt failed"
            );

            // A half-open probe gets exactly one call.
            if breaker.state() == CircuitState::Open {
                tracing::debug!(provider = %name, attempt, "Circuit opened, leaving provider");
                break;
            }

            if class == ErrorClass::ContextLengthExceeded && !state.remediated {
                if let Some(condenser) = self.active_condenser() {
                    state.remediated = true;
                    let condensed = tokio::select! {
                        biased;
                        _ = cancel.cancelled() => return Err(LoopEnd::Cancelled),
                        r = remediation::condense_payload(
                            condenser.as_ref(),
                            &state.payload,
                            self.remediation.summary_max_tokens,
                        ) => r,
                    };
                    match condensed {
                        Ok(payload) => {
                            tracing::info!(
                                provider = %name,
                                attempt,
                                before_chars = remediation::payload_size(&state.payload),
                                after_chars = remediation::payload_size(&payload),
                                "Context condensed, retrying"
                            );
                            metrics::counter!("switchyard_remediations_total").increment(1);
                            state.payload = payload;
                            delay_before = Duration::ZERO;
                            attempt += 1;
                            budget = budget.max(attempt);
                            continue;
                        }
                        Err(e) => {
                            tracing::warn!(provider = %name, error = %e, "Context condensation failed");
                            class = ErrorClass::ServerError;
                        }
                    }
                }
            }

            if !self.retry.should_retry(class, attempt, max_attempts) {
                break;
            }

            let delay = self.retry.next_delay(name, retry, base_delay, max_delay);
            retry += 1;
            tracing::warn!(
                provider = %name,
                attempt,
                max_attempts,
                error_class = %class,
                delay_ms = delay.as_millis() as u64,
                "Retrying provider after backoff"
            );
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(LoopEnd::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
            delay_before = delay;
            attempt += 1;
        }

        Err(LoopEnd::Exhausted)
    }

    fn limiter(&self, provider: &str) -> Option<Arc<RateLimiter>> {
        self.limiters.get(provider).map(|l| Arc::clone(l.value()))
    }

    fn active_condenser(&self) -> Option<&Arc<dyn Condenser>> {
        if self.remediation.enabled {
            self.condenser.as_ref()
        } else {
            None
        }
    }
}

/// Mutable state owned by a single dispatch.
struct DispatchState {
    payload: ChatCompletionRequest,
    remediated: bool,
    attempts: Vec<DispatchAttempt>,
}

impl DispatchState {
    fn record(
        &mut self,
        provider: &str,
        attempt_index: u32,
        error_class: Option<ErrorClass>,
        delay_before: Duration,
        latency_ms: f64,
    ) {
        self.attempts.push(DispatchAttempt {
            provider: provider.to_string(),
            attempt_index,
            error_class,
            delay_before_ms: delay_before.as_millis() as u64,
            latency_ms,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::testing::{stub_entry, StubProvider};
    use crate::registry::ProviderDescriptor;

    fn dispatcher(entries: Vec<ProviderEntry>) -> Dispatcher {
        let registry = Arc::new(ProviderRegistry::new(entries).unwrap());
        Dispatcher::new(registry, &SwitchyardConfig::default())
    }

    #[test]
    fn test_breakers_created_for_enabled_providers() {
        let mut off = ProviderDescriptor::new("off", "http://off", &["m"]);
        off.enabled = false;
        let d = dispatcher(vec![
            stub_entry("a", 1, &["m"]),
            ProviderEntry::new(off, Arc::new(StubProvider::new("off"))),
        ]);
        assert!(d.breakers.contains_key("a"));
        assert!(!d.breakers.contains_key("off"));
    }

    #[test]
    fn test_reload_keeps_existing_breaker_state() {
        let d = dispatcher(vec![stub_entry("a", 1, &["m"])]);
        for _ in 0..5 {
            d.breaker("a").record_failure();
        }
        d.reload(vec![stub_entry("a", 1, &["m"]), stub_entry("b", 2, &["m"])])
            .unwrap();

        assert_eq!(d.breaker("a").state(), CircuitState::Open);
        assert_eq!(d.breaker("b").state(), CircuitState::Closed);
        assert_eq!(d.registry().len(), 2);
    }

    #[test]
    fn test_reload_syncs_rate_limiters() {
        let mut limited = ProviderDescriptor::new("a", "http://a", &["m"]);
        limited.rate_limit_rpm = Some(10);
        let d = dispatcher(vec![ProviderEntry::new(
            limited,
            Arc::new(StubProvider::new("a")),
        )]);
        assert_eq!(d.limiters.get("a").unwrap().limit(), 10);

        d.reload(vec![stub_entry("a", 1, &["m"])]).unwrap();
        assert!(d.limiters.get("a").is_none());
    }

    #[test]
    fn test_reset_unknown_provider() {
        let d = dispatcher(vec![stub_entry("a", 1, &["m"])]);
        assert!(matches!(
            d.reset_circuit_breaker("zzz"),
            Err(RegistryError::ProviderNotFound(_))
        ));
        assert!(d.reset_metrics("a").is_ok());
    }

    #[test]
    fn test_health_report_covers_all_providers() {
        let mut off = ProviderDescriptor::new("off", "http://off", &["m"]);
        off.enabled = false;
        let d = dispatcher(vec![
            stub_entry("a", 1, &["m"]),
            ProviderEntry::new(off, Arc::new(StubProvider::new("off"))),
        ]);
        d.monitor().record_outcome("a", true, 12.0);

        let report = d.provider_health_report();
        assert_eq!(report.len(), 2);
        assert_eq!(report["a"].metrics.total_requests, 1);
        assert_eq!(report["a"].breaker.state, CircuitState::Closed);
        assert!(!report["off"].enabled);
        assert_eq!(report["off"].breaker.state, CircuitState::Closed);
        assert_eq!(
            report["off"].breaker.failure_threshold,
            CircuitBreakerConfig::default().failure_threshold
        );

        // Reporting and resetting a disabled provider leave it without a breaker.
        d.reset_circuit_breaker("off").unwrap();
        assert!(!d.breakers.contains_key("off"));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["a"]["tier"], "unhealthy");
        assert_eq!(json["a"]["breaker"]["state"], "closed");
    }

    #[tokio::test]
    async fn test_trigger_health_check_probes() {
        let d = dispatcher(vec![stub_entry("a", 1, &["m"])]);
        let report = d.trigger_health_check().await;
        assert_eq!(report["a"].metrics.successful_requests, 1);
    }

    #[tokio::test]
    async fn test_pre_cancelled_dispatch() {
        let d = dispatcher(vec![stub_entry("a", 1, &["m"])]);
        let token = CancellationToken::new();
        token.cancel();
        let result = d
            .dispatch("m", ChatCompletionRequest::new("m", vec![]), &token)
            .await;
        assert!(matches!(result, Err(DispatchError::Cancelled)));
    }
}
