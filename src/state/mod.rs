use std::sync::Arc;

use tokio::sync::Mutex;

use crate::core::config::{AppPaths, Settings};
use crate::embeddings::builder::EmbeddingBuilder;
use crate::embeddings::cache::CacheStore;
use crate::embeddings::provider::{EmbeddingProvider, OpenAiEmbeddings};
use crate::embeddings::source::{HttpResourceSource, ResourceSource};
use crate::search::index::SearchIndex;

pub mod error;

use error::InitializationError;

/// Global application state shared across routes and background tasks.
pub struct AppState {
    pub paths: Arc<AppPaths>,
    pub settings: Settings,
    pub cache: CacheStore,
    pub provider: Arc<dyn EmbeddingProvider>,
    pub builder: EmbeddingBuilder,
    pub index: SearchIndex,
    /// Single-build-in-flight guard. The partial and cache snapshots are
    /// not safe for concurrent writers, so every build path holds this.
    pub build_lock: Mutex<()>,
}

impl AppState {
    /// Resolves settings and wires up the services.
    ///
    /// Fails fast when the embedding credential is missing; everything
    /// after that point would fail on the first build anyway.
    pub fn initialize() -> Result<Arc<Self>, InitializationError> {
        let settings = Settings::from_env()?;
        let paths = Arc::new(AppPaths::new());

        let provider: Arc<dyn EmbeddingProvider> = Arc::new(OpenAiEmbeddings::new(
            &settings.embedding_base_url,
            settings.api_key.clone(),
            settings.embedding_model.clone(),
        ));
        let source: Arc<dyn ResourceSource> =
            Arc::new(HttpResourceSource::new(settings.source_url.clone()));
        let cache = CacheStore::new(paths.as_ref().clone());
        let builder = EmbeddingBuilder::new(source, provider.clone(), cache.clone());

        Ok(Arc::new(AppState {
            paths,
            settings,
            cache,
            provider,
            builder,
            index: SearchIndex::new(),
            build_lock: Mutex::new(()),
        }))
    }
}
