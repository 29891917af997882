//! Chat completions endpoint handler.

use super::error::dispatch_error_response;
use crate::api::{ApiError, AppState, ChatCompletionRequest};
use crate::dispatch::DispatchError;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::{info, warn};

/// POST /v1/chat/completions - Dispatch one non-streaming completion.
///
/// The dispatch runs under `server.request_timeout_seconds`; when the
/// deadline passes the in-flight attempt is dropped and the caller gets 504.
pub async fn handle(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatCompletionRequest>,
) -> Response {
    if request.stream {
        return ApiError::bad_request("Streaming responses are not supported").into_response();
    }
    if request.messages.is_empty() {
        return ApiError::bad_request("'messages' must contain at least one message")
            .into_response();
    }

    let model = request.model.clone();
    info!(model = %model, messages = request.messages.len(), "Chat completion request");

    let cancel = state.shutdown.child_token();
    let deadline = state.request_timeout();
    let result = tokio::select! {
        result = state.dispatcher.dispatch(&model, request, &cancel) => result,
        _ = tokio::time::sleep(deadline) => {
            cancel.cancel();
            warn!(model = %model, deadline_secs = deadline.as_secs(), "Dispatch deadline elapsed");
            Err(DispatchError::Cancelled)
        }
    };

    match result {
        Ok(response) => Json(response).into_response(),
        Err(e) => {
            warn!(model = %model, error = %e, "Dispatch failed");
            let available: Vec<String> = state.dispatcher.registry().models().into_iter().collect();
            dispatch_error_response(e, &available)
        }
    }
}
