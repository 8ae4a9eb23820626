// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Read-through response cache.
//!
//! Holds the last successful response per key for offline-first reads.
//! Entries are stored under `cache_<key>` and never expire on their own;
//! callers decide how stale is too stale via [`CacheEntry::is_fresh`].

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;

use crate::error::{Error, Result};
use crate::storage::{load_json, store_json, Storage};

/// Prefix of every cache key in storage.
pub const CACHE_PREFIX: &str = "cache_";

/// Last successful response for one key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: String,
    pub payload: Value,
    pub stored_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Time elapsed since the entry was written. Zero if the clock moved
    /// backwards.
    pub fn age(&self) -> Duration {
        (Utc::now() - self.stored_at).to_std().unwrap_or(Duration::ZERO)
    }

    pub fn is_fresh(&self, max_age: Duration) -> bool {
        self.age() <= max_age
    }
}

/// Persistent key → payload store. Writers are serialized; storage writes
/// are atomic so readers never observe a half-written entry.
pub struct ResponseCache {
    storage: Arc<dyn Storage>,
    lock: RwLock<()>,
}

impl ResponseCache {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        ResponseCache {
            storage,
            lock: RwLock::new(()),
        }
    }

    fn storage_key(key: &str) -> Result<String> {
        if key.is_empty() {
            return Err(Error::InvalidInput("cache key must not be empty".to_string()));
        }
        Ok(format!("{CACHE_PREFIX}{key}"))
    }

    /// Looks up an entry. A corrupt entry is dropped and reported as a miss.
    pub async fn get(&self, key: &str) -> Result<Option<CacheEntry>> {
        let storage_key = Self::storage_key(key)?;
        let _guard = self.lock.read().await;
        match load_json::<CacheEntry>(self.storage.as_ref(), &storage_key) {
            Ok(entry) => Ok(entry),
            Err(Error::Json(e)) => {
                tracing::warn!(key, error = %e, "discarding unreadable cache entry");
                self.storage.remove(&storage_key)?;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Stores `payload` as the latest value for `key` (last write wins).
    pub async fn set(&self, key: &str, payload: Value) -> Result<CacheEntry> {
        let storage_key = Self::storage_key(key)?;
        let entry = CacheEntry {
            key: key.to_string(),
            payload,
            stored_at: Utc::now(),
        };
        let _guard = self.lock.write().await;
        store_json(self.storage.as_ref(), &storage_key, &entry)?;
        tracing::trace!(key, "cache entry stored");
        Ok(entry)
    }

    pub async fn remove(&self, key: &str) -> Result<()> {
        let storage_key = Self::storage_key(key)?;
        let _guard = self.lock.write().await;
        self.storage.remove(&storage_key)
    }

    /// Drops every cached entry. Returns how many were removed.
    pub async fn clear(&self) -> Result<usize> {
        let _guard = self.lock.write().await;
        let mut removed = 0;
        for key in self.storage.keys()? {
            if key.starts_with(CACHE_PREFIX) {
                self.storage.remove(&key)?;
                removed += 1;
            }
        }
        tracing::debug!(removed, "cache cleared");
        Ok(removed)
    }

    /// Keys currently cached, without the storage prefix.
    pub async fn keys(&self) -> Result<Vec<String>> {
        let _guard = self.lock.read().await;
        Ok(self
            .storage
            .keys()?
            .into_iter()
            .filter_map(|k| k.strip_prefix(CACHE_PREFIX).map(str::to_string))
            .collect())
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
