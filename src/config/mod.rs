//! Configuration module for Switchyard
//!
//! Provides layered configuration loading from files, environment variables, and defaults.
//!
//! # Configuration Precedence
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`SWITCHYARD_*`)
//! 3. Configuration file (TOML)
//! 4. Default values (lowest priority)
//!
//! # Example
//!
//! ```rust
//! use switchyard::config::SwitchyardConfig;
//!
//! let toml = r#"
//! [server]
//! port = 9000
//!
//! [[providers]]
//! name = "local"
//! url = "http://localhost:8080"
//! models = ["llama3"]
//! "#;
//! let config: SwitchyardConfig = toml::from_str(toml).unwrap();
//! assert_eq!(config.server.port, 9000);
//! assert_eq!(config.providers[0].priority, 50);
//! ```

pub mod error;
pub mod logging;
pub mod provider;
pub mod remediation;
pub mod routing;
pub mod server;

pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig, UnknownLogFormat};
pub use provider::ProviderConfig;
pub use remediation::RemediationConfig;
pub use routing::{RankOrder, RoutingConfig};
pub use server::ServerConfig;

pub use crate::health::{HealthCheckConfig, MAX_WINDOW_SIZE};
pub use crate::resilience::circuit_breaker::CircuitBreakerConfig;
pub use crate::resilience::retry::RetryConfig;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Default config file looked up by `serve` when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "switchyard.toml";

/// Annotated starter config written by `switchyard config init`.
pub const EXAMPLE_CONFIG: &str = include_str!("../../switchyard.example.toml");

/// Unified configuration for the Switchyard proxy.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SwitchyardConfig {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Background health probing and rolling-window sizing
    pub health_check: HealthCheckConfig,
    /// Breaker thresholds shared by every provider
    pub circuit_breaker: CircuitBreakerConfig,
    /// Global retry defaults
    pub retry: RetryConfig,
    /// Candidate ordering
    pub routing: RoutingConfig,
    /// Oversized-context handling
    pub remediation: RemediationConfig,
    /// Upstream provider catalog
    pub providers: Vec<ProviderConfig>,
}

impl SwitchyardConfig {
    /// Load configuration from a TOML file
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supports SWITCHYARD_* environment variables for common settings.
    /// Invalid values are ignored and the current value is kept.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(port) = std::env::var("SWITCHYARD_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }
        if let Ok(host) = std::env::var("SWITCHYARD_HOST") {
            self.server.host = host;
        }

        if let Ok(level) = std::env::var("SWITCHYARD_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("SWITCHYARD_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                self.logging.format = f;
            }
        }

        if let Ok(health) = std::env::var("SWITCHYARD_HEALTH_CHECK") {
            self.health_check.enabled = health.to_lowercase() == "true";
        }
        if let Ok(attempts) = std::env::var("SWITCHYARD_MAX_ATTEMPTS") {
            if let Ok(n) = attempts.parse() {
                self.retry.max_attempts = n;
            }
        }

        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::validation(
                "server.port",
                "port must be non-zero",
            ));
        }

        if self.circuit_breaker.failure_threshold == 0 {
            return Err(ConfigError::validation(
                "circuit_breaker.failure_threshold",
                "must be at least 1",
            ));
        }

        if self.retry.max_attempts == 0 {
            return Err(ConfigError::validation(
                "retry.max_attempts",
                "must be at least 1",
            ));
        }
        if self.retry.base_delay_ms > self.retry.max_delay_ms {
            return Err(ConfigError::validation(
                "retry.base_delay_ms",
                "base delay cannot exceed max_delay_ms",
            ));
        }

        if self.health_check.max_concurrent_probes == 0 {
            return Err(ConfigError::validation(
                "health_check.max_concurrent_probes",
                "must be at least 1",
            ));
        }
        if !(1..=MAX_WINDOW_SIZE).contains(&self.health_check.window_size) {
            return Err(ConfigError::validation(
                "health_check.window_size",
                format!("must be between 1 and {}", MAX_WINDOW_SIZE),
            ));
        }

        let mut seen = HashSet::new();
        for (i, provider) in self.providers.iter().enumerate() {
            if provider.name.is_empty() {
                return Err(ConfigError::validation(
                    format!("providers[{}].name", i),
                    "name cannot be empty",
                ));
            }
            if provider.url.is_empty() {
                return Err(ConfigError::validation(
                    format!("providers[{}].url", i),
                    "URL cannot be empty",
                ));
            }
            if provider.enabled && provider.models.is_empty() {
                return Err(ConfigError::validation(
                    format!("providers[{}].models", i),
                    "an enabled provider must serve at least one model",
                ));
            }
            if provider.max_retries == Some(0) {
                return Err(ConfigError::validation(
                    format!("providers[{}].max_retries", i),
                    "must be at least 1",
                ));
            }
            if !seen.insert(provider.name.as_str()) {
                return Err(ConfigError::DuplicateProvider(provider.name.clone()));
            }
        }

        Ok(())
    }
}
