use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::core::errors::ApiError;
use crate::search::index::DEFAULT_TOP_K;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResultItem {
    pub title: String,
    pub topic: String,
    pub description: String,
    pub score: f32,
}

/// Embeds the query text and ranks it against the served index.
///
/// Failures here are per-request: they never touch the served index or a
/// build in progress.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SearchRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let query = request
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing required field: query".to_string()))?
        .to_string();

    if state.index.is_empty().await {
        return Err(ApiError::ServiceUnavailable);
    }

    let query_vector = state
        .provider
        .embed(&query)
        .await
        .map_err(ApiError::internal)?;

    let hits = state.index.query(&query_vector, DEFAULT_TOP_K).await?;
    let results: Vec<SearchResultItem> = hits
        .into_iter()
        .map(|hit| SearchResultItem {
            title: hit.resource.title,
            topic: hit.resource.topic,
            description: hit.resource.description,
            score: hit.score,
        })
        .collect();

    Ok(Json(json!({ "query": query, "results": results })))
}
