use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::metrics::now_unix_ms;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub stored_at_ms: u64,
    pub value: Value,
}

/// A fresh entry found in the cache.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheHit {
    pub value: Value,
    pub stored_at_ms: u64,
    pub age_ms: u64,
}

/// File-backed key/value store standing in for a client-side query cache.
///
/// The whole file is one JSON object keyed by cache key. A missing or
/// unreadable file is treated as empty.
#[derive(Debug, Clone)]
pub struct LocalCache {
    path: PathBuf,
    ttl: Duration,
}

impl LocalCache {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            path: path.into(),
            ttl,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the entry for `key` when it is younger than the TTL.
    pub async fn lookup(&self, key: &str) -> Option<CacheHit> {
        let mut entries = self.read_entries().await;
        let entry = entries.remove(key)?;
        let age_ms = now_unix_ms().saturating_sub(entry.stored_at_ms);
        let ttl_ms = u64::try_from(self.ttl.as_millis()).unwrap_or(u64::MAX);
        if age_ms >= ttl_ms {
            debug!("Cache entry {} is stale ({}ms old)", key, age_ms);
            return None;
        }
        Some(CacheHit {
            value: entry.value,
            stored_at_ms: entry.stored_at_ms,
            age_ms,
        })
    }

    /// Stores `value` under `key`, keeping the other entries.
    ///
    /// # Errors
    ///
    /// Returns an error when the cache directory or file cannot be written.
    pub async fn store(&self, key: &str, value: &Value) -> io::Result<()> {
        let mut entries = self.read_entries().await;
        entries.insert(
            key.to_owned(),
            CacheEntry {
                stored_at_ms: now_unix_ms(),
                value: value.clone(),
            },
        );

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec(&entries).map_err(io::Error::other)?;
        tokio::fs::write(&self.path, json).await
    }

    async fn read_entries(&self) -> BTreeMap<String, CacheEntry> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) => {
                debug!("Cache file {} not readable: {}", self.path.display(), err);
                return BTreeMap::new();
            }
        };
        serde_json::from_slice(&bytes).unwrap_or_else(|err| {
            debug!("Ignoring corrupt cache file {}: {}", self.path.display(), err);
            BTreeMap::new()
        })
    }
}
