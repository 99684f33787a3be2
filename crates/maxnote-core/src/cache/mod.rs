//! TTL- and version-aware cache over a `KeyValueStore`.
//!
//! Each entry is stored twice: the JSON `CacheEntry` under
//! `<prefix><key>` and its absolute expiry (epoch ms) under
//! `<prefix><key>-expires`. Expired or version-mismatched entries are
//! cache misses and are deleted as soon as they are seen. Storage failures
//! never reach the caller; they are logged and treated as a miss or no-op.

use chrono::TimeDelta;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::SettingsConfig;
use crate::storage::KeyValueStore;
use crate::util::unix_timestamp_millis;

const EXPIRY_SUFFIX: &str = "-expires";

/// Cached payload stamped with write time and cache format version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub data: T,
    /// Write time (Unix ms)
    pub timestamp: i64,
    pub version: String,
}

#[derive(Debug, Clone)]
pub struct SettingsCache<S: KeyValueStore> {
    store: S,
    prefix: String,
    version: String,
    default_ttl: TimeDelta,
}

impl<S: KeyValueStore> SettingsCache<S> {
    pub fn new(store: S, config: &SettingsConfig) -> Self {
        Self {
            store,
            prefix: config.cache_prefix(),
            version: config.cache_version.clone(),
            default_ttl: config.cache_ttl(),
        }
    }

    /// Running cache format version.
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn entry_key(&self, key: &str) -> String {
        format!("{}{key}", self.prefix)
    }

    pub fn expiry_key(&self, key: &str) -> String {
        format!("{}{key}{EXPIRY_SUFFIX}", self.prefix)
    }

    /// Cache `data` with the configured default TTL.
    pub fn save<T: Serialize>(&self, key: &str, data: &T) -> bool {
        self.save_with_ttl(key, data, self.default_ttl)
    }

    /// Cache `data` until `now + ttl`. A negative TTL stores an entry that is
    /// already expired.
    ///
    /// Returns whether both the entry and its expiry marker were written. A
    /// failed entry write drops the key entirely rather than leaving the
    /// previous entry paired with the new expiry.
    pub fn save_with_ttl<T: Serialize>(&self, key: &str, data: &T, ttl: TimeDelta) -> bool {
        let now = unix_timestamp_millis();
        let entry = CacheEntry {
            data,
            timestamp: now,
            version: self.version.clone(),
        };

        let serialized = match serde_json::to_string(&entry) {
            Ok(serialized) => serialized,
            Err(error) => {
                tracing::warn!("Failed to serialize cache entry {}: {}", key, error);
                return false;
            }
        };
        let expires_at = now.saturating_add(ttl.num_milliseconds());

        // Expiry goes first so an entry never outlives a failed marker write.
        if let Err(error) = self
            .store
            .set(&self.expiry_key(key), &expires_at.to_string())
        {
            tracing::warn!("Failed to write cache expiry for {}: {}", key, error);
            return false;
        }
        if let Err(error) = self.store.set(&self.entry_key(key), &serialized) {
            tracing::warn!("Failed to write cache entry {}: {}", key, error);
            self.clear(Some(key));
            return false;
        }
        true
    }

    /// Load a cached value, or `None` on miss, expiry, version mismatch or
    /// any storage/parse failure.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let expires_raw = match self.store.get(&self.expiry_key(key)) {
            Ok(raw) => raw,
            Err(error) => {
                tracing::warn!("Failed to read cache expiry for {}: {}", key, error);
                return None;
            }
        };

        if let Some(raw) = expires_raw {
            match raw.trim().parse::<i64>() {
                Ok(expires_at) if expires_at < unix_timestamp_millis() => {
                    tracing::debug!("Cache entry {} expired at {}", key, expires_at);
                    self.clear(Some(key));
                    return None;
                }
                Ok(_) => {}
                Err(_) => {
                    tracing::warn!("Discarding cache entry {} with unreadable expiry", key);
                    self.clear(Some(key));
                    return None;
                }
            }
        }

        let raw = match self.store.get(&self.entry_key(key)) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!("Cache miss for {}", key);
                return None;
            }
            Err(error) => {
                tracing::warn!("Failed to read cache entry {}: {}", key, error);
                return None;
            }
        };

        let entry = match serde_json::from_str::<CacheEntry<Value>>(&raw) {
            Ok(entry) => entry,
            Err(error) => {
                tracing::warn!("Discarding unreadable cache entry {}: {}", key, error);
                self.clear(Some(key));
                return None;
            }
        };

        if entry.version != self.version {
            tracing::debug!(
                "Discarding cache entry {} with version {} (running {})",
                key,
                entry.version,
                self.version
            );
            self.clear(Some(key));
            return None;
        }

        match serde_json::from_value(entry.data) {
            Ok(data) => Some(data),
            Err(error) => {
                tracing::warn!("Cache entry {} has an unexpected shape: {}", key, error);
                None
            }
        }
    }

    /// Remove one entry and its expiry marker, or every key under the cache
    /// prefix when `key` is `None`.
    pub fn clear(&self, key: Option<&str>) {
        let targets = match key {
            Some(key) => vec![self.entry_key(key), self.expiry_key(key)],
            None => match self.store.keys() {
                Ok(keys) => keys
                    .into_iter()
                    .filter(|stored| stored.starts_with(&self.prefix))
                    .collect(),
                Err(error) => {
                    tracing::warn!("Failed to list cache keys: {}", error);
                    return;
                }
            },
        };

        for target in targets {
            if let Err(error) = self.store.remove(&target) {
                tracing::warn!("Failed to remove cache key {}: {}", target, error);
            }
        }
    }
}
