//! Error classification.

use crate::provider::ProviderError;
use serde::{Deserialize, Serialize};

/// Upstream messages that mean "the prompt did not fit".
const CONTEXT_PATTERNS: &[&str] = &[
    "context_length_exceeded",
    "maximum context length",
    "context window",
    "too many tokens",
    "request too large",
    "token limit",
    "prompt is too long",
];

/// Kind of failure, derived once per failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    Network,
    Timeout,
    Auth,
    RateLimit,
    ServerError,
    ContextLengthExceeded,
    Unknown,
}

impl ErrorClass {
    pub fn classify(error: &ProviderError) -> Self {
        match error {
            ProviderError::Network(_) => ErrorClass::Network,
            ProviderError::Timeout(_) => ErrorClass::Timeout,
            ProviderError::Upstream { status, message } => Self::from_status(*status, message),
            ProviderError::InvalidResponse(_)
            | ProviderError::Configuration(_)
            | ProviderError::Unsupported(_) => ErrorClass::Unknown,
        }
    }

    fn from_status(status: u16, message: &str) -> Self {
        let lowered = message.to_lowercase();
        if status == 413 || CONTEXT_PATTERNS.iter().any(|p| lowered.contains(p)) {
            return ErrorClass::ContextLengthExceeded;
        }
        match status {
            401 | 403 => ErrorClass::Auth,
            429 => ErrorClass::RateLimit,
            408 => ErrorClass::Timeout,
            500..=599 => ErrorClass::ServerError,
            _ => ErrorClass::Unknown,
        }
    }

    /// Whether the same provider may be tried again after a backoff.
    pub fn is_transient(self) -> bool {
        matches!(
            self,
            ErrorClass::Network | ErrorClass::Timeout | ErrorClass::RateLimit | ErrorClass::ServerError
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorClass::Network => "network",
            ErrorClass::Timeout => "timeout",
            ErrorClass::Auth => "auth",
            ErrorClass::RateLimit => "rate_limit",
            ErrorClass::ServerError => "server_error",
            ErrorClass::ContextLengthExceeded => "context_length_exceeded",
            ErrorClass::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upstream(status: u16, message: &str) -> ProviderError {
        ProviderError::Upstream {
            status,
            message: message.to_string(),
        }
    }

    #[test]
    fn test_transport_errors() {
        assert_eq!(
            ErrorClass::classify(&ProviderError::Network("refused".into())),
            ErrorClass::Network
        );
        assert_eq!(
            ErrorClass::classify(&ProviderError::Timeout(5000)),
            ErrorClass::Timeout
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(ErrorClass::classify(&upstream(401, "bad key")), ErrorClass::Auth);
        assert_eq!(ErrorClass::classify(&upstream(403, "forbidden")), ErrorClass::Auth);
        assert_eq!(ErrorClass::classify(&upstream(429, "slow down")), ErrorClass::RateLimit);
        assert_eq!(ErrorClass::classify(&upstream(408, "")), ErrorClass::Timeout);
        assert_eq!(ErrorClass::classify(&upstream(500, "oops")), ErrorClass::ServerError);
        assert_eq!(ErrorClass::classify(&upstream(503, "busy")), ErrorClass::ServerError);
        assert_eq!(ErrorClass::classify(&upstream(404, "no route")), ErrorClass::Unknown);
    }

    #[test]
    fn test_context_length_detected_from_body() {
        let body = r#"{"error":{"code":"context_length_exceeded","message":"This model's maximum context length is 8192 tokens"}}"#;
        assert_eq!(
            ErrorClass::classify(&upstream(400, body)),
            ErrorClass::ContextLengthExceeded
        );
        assert_eq!(
            ErrorClass::classify(&upstream(400, "Prompt is too long for this model")),
            ErrorClass::ContextLengthExceeded
        );
        assert_eq!(
            ErrorClass::classify(&upstream(413, "payload")),
            ErrorClass::ContextLengthExceeded
        );
    }

    #[test]
    fn test_non_upstream_errors_are_unknown() {
        assert_eq!(
            ErrorClass::classify(&ProviderError::InvalidResponse("junk".into())),
            ErrorClass::Unknown
        );
        assert_eq!(
            ErrorClass::classify(&ProviderError::Unsupported("health_check")),
            ErrorClass::Unknown
        );
    }

    #[test]
    fn test_transient_classes() {
        assert!(ErrorClass::ServerError.is_transient());
        assert!(ErrorClass::RateLimit.is_transient());
        assert!(!ErrorClass::Auth.is_transient());
        assert!(!ErrorClass::ContextLengthExceeded.is_transient());
        assert!(!ErrorClass::Unknown.is_transient());
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(
            serde_json::to_string(&ErrorClass::ContextLengthExceeded).unwrap(),
            "\"context_length_exceeded\""
        );
        assert_eq!(ErrorClass::RateLimit.to_string(), "rate_limit");
    }
}
