//! Durable embedding cache.
//!
//! Three flat files under the data dir: the snapshot (latest successful
//! build), its metadata (freshness record), and a transient partial file
//! holding the contiguous prefix of an interrupted build.
//!
//! Metadata IO problems degrade to "cache invalid" with a warning, because
//! staleness is recoverable by rebuilding. Snapshot IO problems propagate:
//! they happen inside a build and must fail it.

use std::fs;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::config::AppPaths;
use crate::embeddings::EmbeddedResource;

pub const SCHEMA_VERSION: &str = "1";

const FRESHNESS_WINDOW: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cache serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheMetadata {
    pub last_updated: DateTime<Utc>,
    pub item_count: usize,
    pub version: String,
}

impl CacheMetadata {
    pub fn now(item_count: usize) -> Self {
        Self {
            last_updated: Utc::now(),
            item_count,
            version: SCHEMA_VERSION.to_string(),
        }
    }
}

#[derive(Clone)]
pub struct CacheStore {
    paths: AppPaths,
}

impl CacheStore {
    pub fn new(paths: AppPaths) -> Self {
        Self { paths }
    }

    /// True only when metadata exists and parses, the snapshot file is
    /// present, and the last update is inside the freshness window.
    pub fn is_valid(&self) -> bool {
        let Some(meta) = self.read_metadata() else {
            return false;
        };

        let age = Utc::now().signed_duration_since(meta.last_updated);
        let fresh = age
            .to_std()
            .map(|elapsed| elapsed < FRESHNESS_WINDOW)
            .unwrap_or(true); // a future timestamp counts as fresh

        fresh && self.paths.snapshot_path.exists()
    }

    pub fn metadata(&self) -> Option<CacheMetadata> {
        self.read_metadata()
    }

    pub fn load(&self) -> Result<Vec<EmbeddedResource>, CacheError> {
        let data = fs::read_to_string(&self.paths.snapshot_path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Writes the snapshot, then the metadata. The previous metadata is
    /// removed up front and the new metadata only lands after the
    /// snapshot, so at no point can a snapshot pair with a freshness
    /// record from a different build; any failure mid-save leaves the
    /// cache invalid, not wrong.
    pub fn save(
        &self,
        records: &[EmbeddedResource],
        meta: &CacheMetadata,
    ) -> Result<(), CacheError> {
        if self.paths.metadata_path.exists() {
            if let Err(err) = fs::remove_file(&self.paths.metadata_path) {
                tracing::warn!("failed to remove previous cache metadata: {}", err);
            }
        }

        let snapshot = serde_json::to_string(records)?;
        fs::write(&self.paths.snapshot_path, snapshot)?;

        match serde_json::to_string_pretty(meta) {
            Ok(data) => {
                if let Err(err) = fs::write(&self.paths.metadata_path, data) {
                    tracing::warn!("failed to write cache metadata: {}", err);
                }
            }
            Err(err) => tracing::warn!("failed to serialize cache metadata: {}", err),
        }
        Ok(())
    }

    pub fn save_partial(&self, records: &[EmbeddedResource]) -> Result<(), CacheError> {
        let data = serde_json::to_string(records)?;
        fs::write(&self.paths.partial_path, data)?;
        Ok(())
    }

    /// Loads the partial progress snapshot, if a readable one exists.
    /// A corrupt partial means a fresh start, not a crash.
    pub fn load_partial(&self) -> Option<Vec<EmbeddedResource>> {
        if !self.paths.partial_path.exists() {
            return None;
        }
        let data = match fs::read_to_string(&self.paths.partial_path) {
            Ok(data) => data,
            Err(err) => {
                tracing::warn!("failed to read partial snapshot: {}", err);
                return None;
            }
        };
        match serde_json::from_str(&data) {
            Ok(records) => Some(records),
            Err(err) => {
                tracing::warn!("failed to parse partial snapshot: {}", err);
                None
            }
        }
    }

    pub fn clear_partial(&self) {
        if self.paths.partial_path.exists() {
            if let Err(err) = fs::remove_file(&self.paths.partial_path) {
                tracing::warn!("failed to remove partial snapshot: {}", err);
            }
        }
    }

    fn read_metadata(&self) -> Option<CacheMetadata> {
        if !self.paths.metadata_path.exists() {
            return None;
        }
        let data = match fs::read_to_string(&self.paths.metadata_path) {
            Ok(data) => data,
            Err(err) => {
                tracing::warn!("failed to read cache metadata: {}", err);
                return None;
            }
        };
        match serde_json::from_str(&data) {
            Ok(meta) => Some(meta),
            Err(err) => {
                tracing::warn!("failed to parse cache metadata: {}", err);
                None
            }
        }
    }
}
