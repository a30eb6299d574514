//! In-memory search index over the served record collection.
//!
//! The collection is published as an immutable `Arc` snapshot behind an
//! `RwLock`. Publishing swaps the pointer; queries clone the `Arc` and scan
//! outside the lock, so a refresh in progress never blocks or tears a read.
//! Scoring is a linear scan; collections stay in the hundreds to low
//! thousands of records.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;

use crate::core::errors::ApiError;
use crate::embeddings::EmbeddedResource;
use crate::search::scoring::rank_descending_by_cosine;

pub const DEFAULT_TOP_K: usize = 6;

#[derive(Debug, Clone, Serialize)]
pub struct ScoredResource {
    #[serde(flatten)]
    pub resource: EmbeddedResource,
    pub score: f32,
}

#[derive(Clone, Default)]
pub struct SearchIndex {
    served: Arc<RwLock<Arc<Vec<EmbeddedResource>>>>,
}

impl SearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically replaces the served collection.
    pub async fn publish(&self, records: Vec<EmbeddedResource>) {
        let mut guard = self.served.write().await;
        *guard = Arc::new(records);
    }

    pub async fn snapshot(&self) -> Arc<Vec<EmbeddedResource>> {
        self.served.read().await.clone()
    }

    pub async fn is_empty(&self) -> bool {
        self.served.read().await.is_empty()
    }

    pub async fn len(&self) -> usize {
        self.served.read().await.len()
    }

    /// Top-`k` records by cosine similarity to `query`, descending.
    pub async fn query(
        &self,
        query: &[f32],
        k: usize,
    ) -> Result<Vec<ScoredResource>, ApiError> {
        let served = self.snapshot().await;

        let ranked = rank_descending_by_cosine(
            query,
            served.iter().map(|record| record.embedding.as_slice()),
        )?;

        Ok(ranked
            .into_iter()
            .take(k)
            .map(|(idx, score)| ScoredResource {
                resource: served[idx].clone(),
                score,
            })
            .collect())
    }
}
