//! Terminal dispatch errors.

use super::DispatchAttempt;
use thiserror::Error;

/// The only errors a dispatch surfaces to its caller.
#[derive(Debug, Clone, Error)]
pub enum DispatchError {
    /// No enabled provider serves the model. Nothing was attempted.
    #[error("no enabled provider serves model '{model}'")]
    UnsupportedModel { model: String },

    /// Every candidate was skipped or exhausted its attempts.
    #[error("all providers for model '{model}' are unavailable ({} attempts made)", .attempts.len())]
    AllProvidersUnavailable {
        model: String,
        attempts: Vec<DispatchAttempt>,
    },

    /// The caller gave up before any provider answered.
    #[error("dispatch cancelled")]
    Cancelled,
}

impl DispatchError {
    /// Label used for the `outcome` metric dimension.
    pub fn outcome(&self) -> &'static str {
        match self {
            DispatchError::UnsupportedModel { .. } => "unsupported_model",
            DispatchError::AllProvidersUnavailable { .. } => "unavailable",
            DispatchError::Cancelled => "cancelled",
        }
    }
}
