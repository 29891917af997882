//! Mapping from dispatch failures to HTTP responses.

use super::types::{ApiError, ApiErrorBody};
use crate::dispatch::{DispatchAttempt, DispatchError};
use crate::registry::RegistryError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// 503 body for a dispatch that exhausted every candidate.
///
/// A standard error envelope plus the attempts that were made, so a client
/// can tell throttling from outage.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchFailure {
    pub error: ApiErrorBody,
    pub attempts: Vec<DispatchAttempt>,
}

impl DispatchFailure {
    pub fn new(model: &str, attempts: Vec<DispatchAttempt>) -> Self {
        let message = if attempts.is_empty() {
            format!(
                "No provider for model '{}' is currently available (all circuits open or throttled)",
                model
            )
        } else {
            format!(
                "All providers for model '{}' failed after {} attempts",
                model,
                attempts.len()
            )
        };
        Self {
            error: ApiError::service_unavailable(&message).error,
            attempts,
        }
    }
}

impl IntoResponse for DispatchFailure {
    fn into_response(self) -> Response {
        (StatusCode::SERVICE_UNAVAILABLE, Json(self)).into_response()
    }
}

/// Render a dispatch error, listing `available` models on a miss.
pub fn dispatch_error_response(err: DispatchError, available: &[String]) -> Response {
    match err {
        DispatchError::UnsupportedModel { model } => {
            ApiError::model_not_found(&model, available).into_response()
        }
        DispatchError::AllProvidersUnavailable { model, attempts } => {
            DispatchFailure::new(&model, attempts).into_response()
        }
        DispatchError::Cancelled => ApiError::gateway_timeout().into_response(),
    }
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::ProviderNotFound(name) => ApiError::provider_not_found(&name),
            RegistryError::DuplicateProvider(_) => ApiError::bad_request(&err.to_string()),
        }
    }
}
