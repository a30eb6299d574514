use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde_json::json;

use crate::state::AppState;

pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "embeddings_loaded": !state.index.is_empty().await,
        "cache_valid": state.cache.is_valid(),
        "timestamp": Utc::now().to_rfc3339(),
    }))
}
