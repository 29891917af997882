//! Background health probing.

use super::{HealthCheckConfig, HealthCheckError, HealthMonitor};
use crate::registry::{ProviderEntry, ProviderRegistry};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Outcome of probing one provider.
#[derive(Debug, Clone)]
pub enum ProbeResult {
    Healthy { latency_ms: f64 },
    Unhealthy { latency_ms: f64 },
    Failed { latency_ms: f64, error: HealthCheckError },
}

impl ProbeResult {
    pub fn is_healthy(&self) -> bool {
        matches!(self, ProbeResult::Healthy { .. })
    }

    pub fn latency_ms(&self) -> f64 {
        match self {
            ProbeResult::Healthy { latency_ms }
            | ProbeResult::Unhealthy { latency_ms }
            | ProbeResult::Failed { latency_ms, .. } => *latency_ms,
        }
    }
}

/// Probes every enabled provider, feeding the same window as live traffic.
pub struct HealthChecker {
    registry: Arc<ProviderRegistry>,
    monitor: Arc<HealthMonitor>,
    config: HealthCheckConfig,
    permits: Semaphore,
}

impl HealthChecker {
    pub fn new(
        registry: Arc<ProviderRegistry>,
        monitor: Arc<HealthMonitor>,
        config: HealthCheckConfig,
    ) -> Self {
        let permits = Semaphore::new(config.max_concurrent_probes.max(1));
        Self {
            registry,
            monitor,
            config,
            permits,
        }
    }

    pub fn config(&self) -> &HealthCheckConfig {
        &self.config
    }

    /// Probe a single provider, waiting for a free probe slot first.
    pub async fn check_provider(&self, entry: &ProviderEntry) -> ProbeResult {
        // The semaphore is never closed.
        let _permit = self.permits.acquire().await.ok();

        let timeout = Duration::from_secs(self.config.timeout_seconds);
        let started = Instant::now();
        let outcome = tokio::time::timeout(timeout, entry.provider.health_check()).await;
        let latency_ms = started.elapsed().as_secs_f64() * 1000.0;

        match outcome {
            Ok(Ok(probe)) if probe.healthy => ProbeResult::Healthy {
                latency_ms: probe.latency.as_secs_f64() * 1000.0,
            },
            Ok(Ok(_)) => ProbeResult::Unhealthy { latency_ms },
            Ok(Err(e)) => ProbeResult::Failed {
                latency_ms,
                error: e.into(),
            },
            Err(_) => ProbeResult::Failed {
                latency_ms,
                error: HealthCheckError::Timeout(self.config.timeout_seconds),
            },
        }
    }

    /// Feed a probe result into the health monitor.
    pub fn apply_result(&self, provider: &str, result: &ProbeResult) {
        self.monitor
            .record_outcome(provider, result.is_healthy(), result.latency_ms());
        if let ProbeResult::Failed { error, .. } = result {
            tracing::debug!(provider, error = %error, "Health probe failed");
        }
    }

    /// Probe all enabled providers once, at most `max_concurrent_probes` at a time.
    pub async fn check_all_providers(&self) -> Vec<(String, ProbeResult)> {
        let table = self.registry.snapshot();
        let probes = table
            .entries()
            .iter()
            .filter(|e| e.descriptor.enabled)
            .map(|entry| async move {
                let result = self.check_provider(entry).await;
                self.apply_result(entry.name(), &result);
                (entry.name().to_string(), result)
            });

        let results = futures::future::join_all(probes).await;
        let healthy = results.iter().filter(|(_, r)| r.is_healthy()).count();
        tracing::debug!(
            probed = results.len(),
            healthy,
            "Health check round complete"
        );
        results
    }

    /// Start the background probe loop.
    /// Returns a JoinHandle that resolves when the checker stops.
    pub fn start(self: Arc<Self>, cancel_token: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(Duration::from_secs(self.config.interval_seconds.max(1)));
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            tracing::info!(
                interval_seconds = self.config.interval_seconds,
                max_concurrent_probes = self.config.max_concurrent_probes,
                "Health checker started"
            );

            loop {
                tokio::select! {
                    _ = cancel_token.cancelled() => {
                        tracing::info!("Health checker shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        self.check_all_providers().await;
                    }
                }
            }
        })
    }
}
