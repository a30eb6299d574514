//! Content source client.
//!
//! Fetches the full training-resource collection in one request. There is
//! deliberately no retry here: without a source collection there is nothing
//! to resume, so a failed fetch aborts the build attempt at the caller.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("source fetch failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("source returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// One item as published by the content source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct RawResource {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub description: String,
}

impl RawResource {
    /// Text handed to the embedding provider for this item.
    pub fn combined_text(&self) -> String {
        format!("{} {} {}", self.title, self.topic, self.description)
            .trim()
            .to_string()
    }
}

#[async_trait]
pub trait ResourceSource: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<RawResource>, SourceError>;
}

pub struct HttpResourceSource {
    client: Client,
    url: String,
}

impl HttpResourceSource {
    pub fn new(url: String) -> Self {
        Self {
            client: Client::new(),
            url,
        }
    }
}

#[async_trait]
impl ResourceSource for HttpResourceSource {
    async fn fetch_all(&self) -> Result<Vec<RawResource>, SourceError> {
        let res = self.client.get(&self.url).send().await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(SourceError::Status { status, body });
        }

        let items: Vec<RawResource> = res.json().await?;
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    #[test]
    fn combined_text_joins_the_three_fields() {
        let item = RawResource {
            title: "Rust Basics".to_string(),
            topic: "Programming".to_string(),
            description: "An introduction.".to_string(),
        };
        assert_eq!(item.combined_text(), "Rust Basics Programming An introduction.");
    }

    #[tokio::test]
    async fn fetch_all_parses_pascal_case_items() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/resources");
                then.status(200).json_body(json!([
                    { "Title": "A", "Topic": "X", "Description": "d1" },
                    { "Title": "B", "Topic": "Y", "Description": "d2" }
                ]));
            })
            .await;

        let source = HttpResourceSource::new(format!("{}/resources", server.base_url()));
        let items = source.fetch_all().await.expect("fetch");

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "A");
        assert_eq!(items[1].description, "d2");
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/resources");
                then.status(502).body("bad gateway");
            })
            .await;

        let source = HttpResourceSource::new(format!("{}/resources", server.base_url()));
        let err = source.fetch_all().await.unwrap_err();

        assert!(matches!(err, SourceError::Status { status, .. } if status.as_u16() == 502));
    }
}
