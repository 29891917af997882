//! Retry decisions and exponential backoff with jitter.

use super::classify::ErrorClass;
use dashmap::DashMap;
use parking_lot::Mutex;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

/// Global retry defaults. Providers may override attempts and base delay.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    /// Attempts per provider before falling back to the next candidate.
    pub max_attempts: u32,
    /// Use [`AdaptiveBackoff`] instead of [`ExponentialBackoff`].
    pub adaptive: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: 1_000,
            max_delay_ms: 60_000,
            max_attempts: 3,
            adaptive: false,
        }
    }
}

impl RetryConfig {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    /// Strategy selected by the `adaptive` flag.
    pub fn strategy(&self) -> Arc<dyn RetryStrategy> {
        if self.adaptive {
            Arc::new(AdaptiveBackoff::new())
        } else {
            Arc::new(ExponentialBackoff)
        }
    }
}

/// Decides whether a failed attempt is retried and how long to wait first.
pub trait RetryStrategy: Send + Sync {
    /// `attempt` is the number of attempts already made against this provider.
    ///
    /// Auth, context-length and unknown failures are never retried here.
    fn should_retry(&self, class: ErrorClass, attempt: u32, max_attempts: u32) -> bool {
        class.is_transient() && attempt < max_attempts
    }

    /// Delay before retry number `retry` (zero-based) against `provider`.
    fn next_delay(&self, provider: &str, retry: u32, base: Duration, max: Duration) -> Duration;

    /// Feed back the outcome of an attempt and the delay that preceded it.
    fn record_outcome(&self, _provider: &str, _success: bool, _delay: Duration) {}
}

/// `base * 2^retry`, capped at `max`.
pub fn backoff_ceiling(retry: u32, base: Duration, max: Duration) -> Duration {
    base.saturating_mul(2u32.saturating_pow(retry)).min(max)
}

/// Uniform jitter in `[0.1 * delay, 1.0 * delay]`.
pub fn with_jitter(delay: Duration) -> Duration {
    let factor = rand::thread_rng().gen_range(0.1..=1.0);
    delay.mul_f64(factor)
}

/// Plain exponential backoff with jitter.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExponentialBackoff;

impl RetryStrategy for ExponentialBackoff {
    fn next_delay(&self, _provider: &str, retry: u32, base: Duration, max: Duration) -> Duration {
        with_jitter(backoff_ceiling(retry, base, max))
    }
}

const ADAPTIVE_WINDOW: usize = 20;
const ADAPTIVE_MIN_SAMPLES: usize = 5;

/// Recent behavior of one provider as seen by [`AdaptiveBackoff`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdaptiveStats {
    pub samples: usize,
    pub success_ratio: f64,
    pub average_delay: Duration,
}

#[derive(Debug, Default)]
struct OutcomeHistory {
    outcomes: VecDeque<(bool, Duration)>,
}

impl OutcomeHistory {
    fn push(&mut self, success: bool, delay: Duration) {
        if self.outcomes.len() == ADAPTIVE_WINDOW {
            self.outcomes.pop_front();
        }
        self.outcomes.push_back((success, delay));
    }

    fn stats(&self) -> AdaptiveStats {
        let samples = self.outcomes.len();
        if samples == 0 {
            return AdaptiveStats {
                samples,
                success_ratio: 1.0,
                average_delay: Duration::ZERO,
            };
        }
        let successes = self.outcomes.iter().filter(|(ok, _)| *ok).count();
        let total_delay: Duration = self.outcomes.iter().map(|(_, d)| *d).sum();
        AdaptiveStats {
            samples,
            success_ratio: successes as f64 / samples as f64,
            average_delay: total_delay / samples as u32,
        }
    }
}

/// Exponential backoff whose base delay follows each provider's recent
/// success ratio.
///
/// An unbroken success streak halves the base; a provider failing more often
/// than not gets double the base, never beyond `max`.
#[derive(Debug, Default)]
pub struct AdaptiveBackoff {
    history: DashMap<String, Mutex<OutcomeHistory>>,
}

impl AdaptiveBackoff {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self, provider: &str) -> Option<AdaptiveStats> {
        self.history.get(provider).map(|h| h.lock().stats())
    }

    /// Base delay after tuning for `provider`.
    pub fn effective_base(&self, provider: &str, base: Duration, max: Duration) -> Duration {
        let Some(stats) = self.stats(provider) else {
            return base;
        };
        if stats.samples < ADAPTIVE_MIN_SAMPLES {
            return base;
        }
        if stats.success_ratio >= 1.0 {
            base / 2
        } else if stats.success_ratio < 0.5 {
            base.saturating_mul(2).min(max)
        } else {
            base
        }
    }
}

impl RetryStrategy for AdaptiveBackoff {
    fn next_delay(&self, provider: &str, retry: u32, base: Duration, max: Duration) -> Duration {
        let base = self.effective_base(provider, base, max);
        with_jitter(backoff_ceiling(retry, base, max))
    }

    fn record_outcome(&self, provider: &str, success: bool, delay: Duration) {
        if let Some(history) = self.history.get(provider) {
            history.lock().push(success, delay);
            return;
        }
        self.history
            .entry(provider.to_string())
            .or_default()
            .lock()
            .push(success, delay);
    }
}
