//! Models listing endpoint handler.

use crate::api::AppState;
use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

/// Models list response in OpenAI format.
#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub object: String,
    pub data: Vec<ModelObject>,
}

/// Individual model object.
#[derive(Debug, Serialize)]
pub struct ModelObject {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub owned_by: String,
    /// Enabled providers serving this model, in priority order.
    pub providers: Vec<String>,
}

/// GET /v1/models - List every model served by an enabled provider.
///
/// Health does not filter this list; a model whose providers are all
/// degraded still dispatches through the fallback path.
pub async fn handle(State(state): State<Arc<AppState>>) -> Json<ModelsResponse> {
    let registry = state.dispatcher.registry();
    let created = chrono::Utc::now().timestamp();

    let data = registry
        .models()
        .into_iter()
        .map(|id| {
            let providers = registry
                .providers_for_model(&id)
                .iter()
                .map(|e| e.name().to_string())
                .collect();
            ModelObject {
                id,
                object: "model".to_string(),
                created,
                owned_by: "switchyard".to_string(),
                providers,
            }
        })
        .collect();

    Json(ModelsResponse {
        object: "list".to_string(),
        data,
    })
}
