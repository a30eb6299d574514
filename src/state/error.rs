use thiserror::Error;

use crate::core::config::ConfigError;

#[derive(Debug, Error)]
pub enum InitializationError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
