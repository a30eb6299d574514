//! Embedding build pipeline.
//!
//! Drives fetch -> per-item embed -> persist, strictly sequentially. The
//! sequencing is intentional pacing against the provider's rate limits,
//! not an accident. Progress is checkpointed to the partial snapshot so a
//! crash or provider failure loses at most one checkpoint interval of work,
//! and a later run can resume from the persisted prefix.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::embeddings::cache::{CacheError, CacheMetadata, CacheStore};
use crate::embeddings::provider::{EmbeddingProvider, ProviderError};
use crate::embeddings::source::{ResourceSource, SourceError};
use crate::embeddings::EmbeddedResource;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("source fetch failed: {0}")]
    Source(#[from] SourceError),
    #[error("build aborted, {completed}/{total} items completed: {source}")]
    Provider {
        completed: usize,
        total: usize,
        #[source]
        source: ProviderError,
    },
    #[error("cache error during build: {0}")]
    Cache(#[from] CacheError),
}

#[derive(Debug, Clone, Copy)]
pub struct BuilderConfig {
    /// Pause between successive provider calls.
    pub base_delay: Duration,
    /// Extra pause per recent consecutive error.
    pub error_delay_step: Duration,
    /// Upper bound on the error-driven extra pause.
    pub max_error_delay: Duration,
    /// Checkpoint the partial snapshot every this many successes.
    pub checkpoint_interval: usize,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(200),
            error_delay_step: Duration::from_millis(500),
            max_error_delay: Duration::from_millis(5000),
            checkpoint_interval: 25,
        }
    }
}

pub struct EmbeddingBuilder {
    source: Arc<dyn ResourceSource>,
    provider: Arc<dyn EmbeddingProvider>,
    cache: CacheStore,
    config: BuilderConfig,
    /// Survives across build attempts on this instance, so runs resumed
    /// after failures pace themselves harder until a success lands.
    consecutive_errors: AtomicU32,
}

impl EmbeddingBuilder {
    pub fn new(
        source: Arc<dyn ResourceSource>,
        provider: Arc<dyn EmbeddingProvider>,
        cache: CacheStore,
    ) -> Self {
        Self::with_config(source, provider, cache, BuilderConfig::default())
    }

    pub fn with_config(
        source: Arc<dyn ResourceSource>,
        provider: Arc<dyn EmbeddingProvider>,
        cache: CacheStore,
        config: BuilderConfig,
    ) -> Self {
        Self {
            source,
            provider,
            cache,
            config,
            consecutive_errors: AtomicU32::new(0),
        }
    }

    /// Produces the full embedded collection.
    ///
    /// Unless `force_refresh` is set, a valid cache is returned as-is with
    /// no network traffic; `resume_from_partial` only bypasses that when an
    /// interrupted build actually left a partial behind. Otherwise the
    /// source is re-fetched and every item from the start index onward is
    /// embedded one at a time. Not safe for concurrent invocation; the
    /// caller holds the single-build-in-flight lock.
    pub async fn build(
        &self,
        force_refresh: bool,
        resume_from_partial: bool,
    ) -> Result<Vec<EmbeddedResource>, BuildError> {
        let partial = if resume_from_partial {
            self.cache.load_partial()
        } else {
            None
        };

        if !force_refresh && partial.is_none() && self.cache.is_valid() {
            tracing::info!("cache is fresh, serving existing snapshot");
            return Ok(self.cache.load()?);
        }

        let items = self.source.fetch_all().await?;
        let total = items.len();

        let mut records: Vec<EmbeddedResource> = partial.unwrap_or_default();
        let start = records.len();
        if start > 0 {
            tracing::info!("resuming build at item {}/{}", start, total);
        }

        for (pos, item) in items.iter().enumerate().skip(start) {
            let text = item.combined_text();
            match self.provider.embed(&text).await {
                Ok(embedding) => {
                    records.push(EmbeddedResource::new(item.clone(), embedding));

                    let recent_errors = self.consecutive_errors.swap(0, Ordering::SeqCst);
                    if records.len() % self.config.checkpoint_interval == 0 {
                        self.cache.save_partial(&records)?;
                        tracing::debug!("checkpointed {}/{} items", records.len(), total);
                    }
                    if pos + 1 < total {
                        tokio::time::sleep(self.inter_item_delay(recent_errors)).await;
                    }
                }
                Err(err) => {
                    self.consecutive_errors.fetch_add(1, Ordering::SeqCst);
                    if let Err(save_err) = self.cache.save_partial(&records) {
                        tracing::warn!(
                            "failed to persist partial progress before abort: {}",
                            save_err
                        );
                    }
                    tracing::error!(
                        "embedding failed at item {}/{}, aborting build: {}",
                        pos + 1,
                        total,
                        err
                    );
                    return Err(BuildError::Provider {
                        completed: records.len(),
                        total,
                        source: err,
                    });
                }
            }
        }

        self.cache.clear_partial();
        self.cache.save(&records, &CacheMetadata::now(total))?;
        tracing::info!("build complete, {} items embedded", records.len());
        Ok(records)
    }

    fn inter_item_delay(&self, recent_errors: u32) -> Duration {
        let extra = self
            .config
            .error_delay_step
            .saturating_mul(recent_errors)
            .min(self.config.max_error_delay);
        self.config.base_delay + extra
    }
}
