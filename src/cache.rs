//! # Hash Cache Module
//!
//! Persistent content-hash cache used to skip files that were already
//! processed on a previous `--write` run.
//!
//! ## Responsibilities:
//! - Compute stable content digests (SHA-256, lowercase hex)
//! - Round-trip a flat `digest -> sentinel` map through a JSON file
//! - At-most-once insertion per distinct content within a run
//!
//! ## Persistence strategy:
//! - One JSON file per namespace in `~/.minify-image/<namespace>.json`
//! - Loaded once at run start, saved once at normal run end
//! - No crash-safety guarantee: an interrupted run simply re-processes
//!
//! ## Example cache file:
//! ```json
//! {
//!   "entries": {
//!     "9f86d081884c7d65...": 1
//!   }
//! }
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::MinifyError;

/// Compute the content digest used as cache key: SHA-256, lowercase hex
pub fn digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Serialized shape of the cache file
#[derive(Debug, Serialize, Deserialize, Default)]
struct CacheFile {
    entries: HashMap<String, u8>,
}

/// Persistent store of content hashes already processed
pub struct HashCache {
    cache_file_path: PathBuf,
    data: CacheFile,
}

impl HashCache {
    /// Load (or initialize) the cache for a namespace from the default
    /// location under the home directory
    pub async fn load(namespace: &str) -> Result<Self> {
        let cache_dir = dirs::home_dir()
            .ok_or_else(|| MinifyError::Cache("could not find home directory".to_string()))?
            .join(".minify-image");
        Self::load_from(&cache_dir, namespace).await
    }

    /// Load (or initialize) the cache from an explicit directory
    pub async fn load_from(cache_dir: &Path, namespace: &str) -> Result<Self> {
        fs::create_dir_all(cache_dir).await?;
        let cache_file_path = cache_dir.join(format!("{}.json", namespace));

        let data = if cache_file_path.exists() {
            let content = fs::read_to_string(&cache_file_path).await?;
            serde_json::from_str(&content).unwrap_or_default()
        } else {
            CacheFile::default()
        };

        Ok(Self {
            cache_file_path,
            data,
        })
    }

    /// Empty cache with no backing file, used by dry-run mode where the
    /// store is never consulted nor persisted
    pub fn in_memory() -> Self {
        Self {
            cache_file_path: PathBuf::new(),
            data: CacheFile::default(),
        }
    }

    /// Persist the cache to disk
    pub async fn save(&self) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.data)?;
        fs::write(&self.cache_file_path, content).await?;
        Ok(())
    }

    /// Check whether a content digest was already recorded
    pub fn contains(&self, key: &str) -> bool {
        self.data.entries.contains_key(key)
    }

    /// Record a content digest. Inserting the same digest twice is a no-op.
    pub fn insert(&mut self, key: String) {
        self.data.entries.entry(key).or_insert(1);
    }

    pub fn len(&self) -> usize {
        self.data.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.entries.is_empty()
    }
}
