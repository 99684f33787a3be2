//! Runtime configuration for the settings core.
//!
//! Provides a `SettingsConfig` shared by the store, the cache and the sync
//! layer. Every field has a default so an empty JSON object is a valid config.

use std::time::Duration;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::util::normalize_text_option;

/// Storage key of the canonical settings blob and prefix of cache keys.
pub const DEFAULT_NAMESPACE: &str = "maxnote-settings";
/// Cache format version stamped into every `CacheEntry`.
pub const DEFAULT_CACHE_VERSION: &str = "1.0.0";
const DEFAULT_CACHE_TTL_MS: i64 = 24 * 60 * 60 * 1000;
const DEFAULT_SYNC_DELAY_MS: u64 = 1000;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SettingsConfig {
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default = "default_cache_version")]
    pub cache_version: String,
    #[serde(default = "default_cache_ttl_ms")]
    pub cache_ttl_ms: i64,
    #[serde(default = "default_sync_delay_ms")]
    pub sync_delay_ms: u64,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            cache_version: default_cache_version(),
            cache_ttl_ms: default_cache_ttl_ms(),
            sync_delay_ms: default_sync_delay_ms(),
        }
    }
}

impl SettingsConfig {
    /// Key holding the canonical settings blob (`maxnote-settings`).
    pub fn settings_key(&self) -> &str {
        &self.namespace
    }

    /// Prefix shared by every cache entry (`maxnote-settings-`).
    pub fn cache_prefix(&self) -> String {
        format!("{}-", self.namespace)
    }

    pub fn cache_ttl(&self) -> TimeDelta {
        TimeDelta::milliseconds(self.cache_ttl_ms)
    }

    pub const fn sync_delay(&self) -> Duration {
        Duration::from_millis(self.sync_delay_ms)
    }

    fn validate(mut self) -> Result<Self, String> {
        self.namespace = normalize_text_option(Some(self.namespace))
            .ok_or_else(|| "config field 'namespace' must not be empty".to_string())?;
        self.cache_version = normalize_text_option(Some(self.cache_version))
            .ok_or_else(|| "config field 'cache_version' must not be empty".to_string())?;
        if self.cache_ttl_ms <= 0 {
            return Err(format!(
                "config field 'cache_ttl_ms' must be positive (got {})",
                self.cache_ttl_ms
            ));
        }
        Ok(self)
    }
}

/// Parse and validate a config from a raw JSON payload.
pub fn parse_settings_config(payload: &str) -> Result<SettingsConfig, String> {
    if payload.trim().is_empty() {
        return Ok(SettingsConfig::default());
    }
    let config: SettingsConfig = serde_json::from_str(payload)
        .map_err(|error| format!("invalid settings config JSON: {error}"))?;
    config.validate()
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

fn default_cache_version() -> String {
    DEFAULT_CACHE_VERSION.to_string()
}

const fn default_cache_ttl_ms() -> i64 {
    DEFAULT_CACHE_TTL_MS
}

const fn default_sync_delay_ms() -> u64 {
    DEFAULT_SYNC_DELAY_MS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_payload_yields_defaults() {
        let config = parse_settings_config("").unwrap();
        assert_eq!(config, SettingsConfig::default());
        assert_eq!(config.settings_key(), "maxnote-settings");
        assert_eq!(config.cache_prefix(), "maxnote-settings-");
        assert_eq!(config.cache_ttl(), TimeDelta::hours(24));
    }

    #[test]
    fn partial_payload_keeps_other_defaults() {
        let config = parse_settings_config(r#"{ "sync_delay_ms": 10 }"#).unwrap();
        assert_eq!(config.sync_delay(), Duration::from_millis(10));
        assert_eq!(config.cache_version, "1.0.0");
    }

    #[test]
    fn parse_config_rejects_unknown_fields() {
        let error = parse_settings_config(r#"{ "namespace": "x", "extra": 1 }"#).unwrap_err();
        assert!(error.contains("unknown field"));
    }

    #[test]
    fn parse_config_rejects_non_positive_ttl() {
        let error = parse_settings_config(r#"{ "cache_ttl_ms": 0 }"#).unwrap_err();
        assert!(error.contains("cache_ttl_ms"));
    }

    #[test]
    fn parse_config_rejects_blank_namespace() {
        let error = parse_settings_config(r#"{ "namespace": "  " }"#).unwrap_err();
        assert!(error.contains("namespace"));
    }
}
