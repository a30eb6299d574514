use std::env;
use std::fs;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(&'static str),
}

/// Filesystem locations for logs and the embedding cache.
#[derive(Debug, Clone)]
pub struct AppPaths {
    pub data_dir: PathBuf,
    pub log_dir: PathBuf,
    pub snapshot_path: PathBuf,
    pub metadata_path: PathBuf,
    pub partial_path: PathBuf,
}

impl AppPaths {
    pub fn new() -> Self {
        let data_dir = discover_data_dir();
        Self::at(data_dir)
    }

    /// Builds paths rooted at an explicit data directory. Used by tests.
    pub fn at(data_dir: PathBuf) -> Self {
        let log_dir = data_dir.join("logs");
        let snapshot_path = data_dir.join("embeddings_cache.json");
        let metadata_path = data_dir.join("cache_metadata.json");
        let partial_path = data_dir.join("embeddings_partial.json");

        for dir in [&data_dir, &log_dir] {
            let _ = fs::create_dir_all(dir);
        }

        AppPaths {
            data_dir,
            log_dir,
            snapshot_path,
            metadata_path,
            partial_path,
        }
    }
}

fn discover_data_dir() -> PathBuf {
    if let Ok(dir) = env::var("SKILLSCOUT_DATA_DIR") {
        return PathBuf::from(dir);
    }

    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    manifest_dir.join("data")
}

/// Runtime settings, resolved from the environment at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: String,
    pub embedding_base_url: String,
    pub embedding_model: String,
    pub source_url: String,
    pub port: u16,
}

impl Settings {
    /// Reads settings from the environment.
    ///
    /// The embedding provider credential is required; startup fails without
    /// it rather than limping along and failing on the first build.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key =
            env::var("OPENAI_API_KEY").map_err(|_| ConfigError::MissingVar("OPENAI_API_KEY"))?;
        let source_url = env::var("SKILLSCOUT_SOURCE_URL")
            .map_err(|_| ConfigError::MissingVar("SKILLSCOUT_SOURCE_URL"))?;

        let embedding_base_url = env::var("SKILLSCOUT_EMBEDDING_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());
        let embedding_model = env::var("SKILLSCOUT_EMBEDDING_MODEL")
            .unwrap_or_else(|_| "text-embedding-3-small".to_string());
        let port = env::var("PORT")
            .ok()
            .and_then(|val| val.parse::<u16>().ok())
            .unwrap_or(3000);

        Ok(Settings {
            api_key,
            embedding_base_url,
            embedding_model,
            source_url,
            port,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_rooted_at_the_data_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = AppPaths::at(dir.path().to_path_buf());

        assert!(paths.log_dir.starts_with(dir.path()));
        assert_eq!(
            paths.snapshot_path.file_name().unwrap(),
            "embeddings_cache.json"
        );
        assert!(paths.log_dir.exists());
    }
}
