//! Structured logging helpers.

pub mod middleware;

pub use middleware::generate_request_id;

/// Turn `[logging]` into an `EnvFilter` directive string:
/// `"base_level,switchyard::component=level,..."`, components in name order.
///
/// # Examples
///
/// ```
/// use switchyard::config::{LogFormat, LoggingConfig};
/// use switchyard::logging::build_filter_directives;
/// use std::collections::BTreeMap;
///
/// let config = LoggingConfig {
///     level: "info".to_string(),
///     format: LogFormat::Pretty,
///     component_levels: BTreeMap::from([("dispatch".to_string(), "debug".to_string())]),
/// };
///
/// assert_eq!(build_filter_directives(&config), "info,switchyard::dispatch=debug");
/// ```
pub fn build_filter_directives(config: &crate::config::LoggingConfig) -> String {
    let mut filter_str = config.level.clone();

    for (component, level) in &config.component_levels {
        filter_str.push_str(&format!(",switchyard::{}={}", component, level));
    }

    filter_str
}
