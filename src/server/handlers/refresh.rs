use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde_json::json;

use crate::core::errors::ApiError;
use crate::refresh::run_manual_refresh;
use crate::state::AppState;

/// Forces a full rebuild and republish, outside the daily schedule.
pub async fn refresh(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let count = run_manual_refresh(&state).await?;

    Ok(Json(json!({
        "success": true,
        "message": format!("Refreshed {} resources", count),
        "timestamp": Utc::now().to_rfc3339(),
    })))
}
