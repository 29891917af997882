//! Rolling per-provider performance window.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy)]
struct Sample {
    success: bool,
    latency_ms: f64,
}

/// Totals plus a bounded window of recent outcomes.
///
/// Average latency and error rate are derived from the window on read.
#[derive(Debug, Clone)]
pub struct ProviderMetrics {
    total_requests: u64,
    successful_requests: u64,
    failed_requests: u64,
    window: VecDeque<Sample>,
    capacity: usize,
    last_request_time: Option<DateTime<Utc>>,
}

impl ProviderMetrics {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            total_requests: 0,
            successful_requests: 0,
            failed_requests: 0,
            window: VecDeque::with_capacity(capacity),
            capacity,
            last_request_time: None,
        }
    }

    pub fn record(&mut self, success: bool, latency_ms: f64) {
        if self.window.len() == self.capacity {
            self.window.pop_front();
        }
        self.window.push_back(Sample {
            success,
            latency_ms: latency_ms.max(0.0),
        });
        self.total_requests += 1;
        if success {
            self.successful_requests += 1;
        } else {
            self.failed_requests += 1;
        }
        self.last_request_time = Some(Utc::now());
    }

    pub fn total_requests(&self) -> u64 {
        self.total_requests
    }

    pub fn window_len(&self) -> usize {
        self.window.len()
    }

    /// Mean latency over the window, 0 when empty.
    pub fn average_latency_ms(&self) -> f64 {
        if self.window.is_empty() {
            return 0.0;
        }
        self.window.iter().map(|s| s.latency_ms).sum::<f64>() / self.window.len() as f64
    }

    /// Failed fraction of the window in `[0, 1]`.
    pub fn error_rate(&self) -> f64 {
        if self.window.is_empty() {
            return 0.0;
        }
        let failures = self.window.iter().filter(|s| !s.success).count();
        failures as f64 / self.window.len() as f64
    }

    /// `latency_seconds + 10 * error_rate`; lower is better.
    pub fn performance_score(&self) -> f64 {
        self.average_latency_ms() / 1000.0 + 10.0 * self.error_rate()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            total_requests: self.total_requests,
            successful_requests: self.successful_requests,
            failed_requests: self.failed_requests,
            window_len: self.window.len(),
            average_latency_ms: self.average_latency_ms(),
            error_rate_pct: self.error_rate() * 100.0,
            performance_score: self.performance_score(),
            last_request_time: self.last_request_time,
        }
    }
}

/// Serializable copy of a provider's metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub window_len: usize,
    pub average_latency_ms: f64,
    pub error_rate_pct: f64,
    pub performance_score: f64,
    pub last_request_time: Option<DateTime<Utc>>,
}

impl MetricsSnapshot {
    /// Snapshot for a provider that has never been observed.
    pub fn empty() -> Self {
        ProviderMetrics::new(1).snapshot()
    }
}
