//! Resilience primitives shared by the dispatcher.
//!
//! - [`circuit_breaker`]: per-provider closed/open/half-open state machine
//! - [`retry`]: classification-aware retry decisions and jittered backoff
//! - [`classify`]: the single mapping from a raw provider error to an [`ErrorClass`]
//! - [`rate_limit`]: per-provider requests-per-minute budget

pub mod circuit_breaker;
pub mod classify;
pub mod rate_limit;
pub mod retry;

pub use circuit_breaker::{BreakerSnapshot, CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use classify::ErrorClass;
pub use rate_limit::RateLimiter;
pub use retry::{AdaptiveBackoff, ExponentialBackoff, RetryConfig, RetryStrategy};
