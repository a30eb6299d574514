//! Embedding provider client.
//!
//! Talks to an OpenAI-compatible `/embeddings` endpoint. Transient failures
//! (transport errors, 429, 5xx) are retried with exponential backoff; any
//! other non-success status fails immediately with the response captured.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::backoff::BackoffPolicy;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("embedding request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("embedding provider returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("embedding retries exhausted after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: u32,
        source: Box<ProviderError>,
    },
    #[error("embedding response contained no vector")]
    EmptyResponse,
}

impl ProviderError {
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::Transport(_) => true,
            ProviderError::Status { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            _ => false,
        }
    }
}

#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError>;
}

#[derive(Clone)]
pub struct OpenAiEmbeddings {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    backoff: BackoffPolicy,
}

impl OpenAiEmbeddings {
    pub fn new(base_url: &str, api_key: String, model: String) -> Self {
        Self::with_backoff(base_url, api_key, model, BackoffPolicy::default())
    }

    pub fn with_backoff(
        base_url: &str,
        api_key: String,
        model: String,
        backoff: BackoffPolicy,
    ) -> Self {
        Self {
            client: Client::new(),
            endpoint: format!("{}/embeddings", base_url.trim_end_matches('/')),
            api_key,
            model,
            backoff,
        }
    }

    async fn request_embedding(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        let body = EmbeddingRequest {
            model: &self.model,
            input: text,
        };

        let res = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(ProviderError::Status { status, body });
        }

        let payload: EmbeddingResponse = res.json().await?;
        payload
            .data
            .into_iter()
            .next()
            .map(|entry| entry.embedding)
            .ok_or(ProviderError::EmptyResponse)
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddings {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        let result = self
            .backoff
            .retry(|| self.request_embedding(text), ProviderError::is_retryable)
            .await;

        match result {
            // A retryable error coming back means every attempt was spent.
            Err(err) if err.is_retryable() => Err(ProviderError::RetriesExhausted {
                attempts: self.backoff.max_attempts,
                source: Box::new(err),
            }),
            other => other,
        }
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}
