use std::path::{Path, PathBuf};

use chrono::{TimeZone, Utc};
use maxnote_core::config::SettingsConfig;
use maxnote_core::export::SnapshotFormat;
use maxnote_core::models::{SettingsField, UserSettings};
use maxnote_core::storage::FileStore;
use maxnote_core::sync::{ConflictResolution, SettingsSync, SimulatedTransport};
use maxnote_core::SettingsStore;
use serde_json::Value;

use crate::cli::{ArtifactFormat, Resolution};
use crate::error::CliError;

/// Storage and config shared by every command.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub storage: FileStore,
    pub config: SettingsConfig,
}

impl AppContext {
    pub fn new(data_path: PathBuf, config: SettingsConfig) -> Self {
        Self {
            storage: FileStore::new(data_path),
            config,
        }
    }

    pub fn open_store(&self) -> SettingsStore<FileStore> {
        let store = SettingsStore::load(self.storage.clone(), &self.config);
        if let Some(error) = &store.status().load_error {
            eprintln!("Warning: {error}");
        }
        store
    }

    pub fn open_sync(
        &self,
        remote: Option<UserSettings>,
    ) -> SettingsSync<FileStore, SimulatedTransport> {
        let mut transport = SimulatedTransport::new(self.config.sync_delay());
        if let Some(remote) = remote {
            transport = transport.with_remote(remote);
        }
        SettingsSync::new(self.storage.clone(), &self.config, transport)
    }
}

pub const fn snapshot_format(format: ArtifactFormat) -> SnapshotFormat {
    match format {
        ArtifactFormat::Json => SnapshotFormat::Json,
        ArtifactFormat::Csv => SnapshotFormat::Csv,
    }
}

pub const fn conflict_resolution(resolution: Resolution) -> ConflictResolution {
    match resolution {
        Resolution::Local => ConflictResolution::Local,
        Resolution::Remote => ConflictResolution::Remote,
        Resolution::Merge => ConflictResolution::Merge,
    }
}

/// Split `field=value` into a known field and its raw value.
pub fn parse_field_pair(pair: &str) -> Result<(SettingsField, Value), CliError> {
    let (name, raw) = pair
        .split_once('=')
        .ok_or_else(|| CliError::MalformedPair(pair.to_string()))?;
    let field = name.parse::<SettingsField>()?;
    Ok((field, field.parse_input(raw)))
}

/// Read a full or partial settings snapshot from a JSON file, filling gaps
/// with defaults.
pub fn read_snapshot(path: &Path) -> Result<UserSettings, CliError> {
    let raw = std::fs::read_to_string(path)?;
    let map = maxnote_core::export::parse_json_import(&raw)?;
    let patch = maxnote_core::SettingsPatch::from_json_lenient(&map);
    Ok(UserSettings::with_defaults(&patch))
}

/// One `field: value` line per set field.
pub fn format_settings_lines(settings: &UserSettings) -> Vec<String> {
    let values = settings.field_map();
    SettingsField::ALL
        .into_iter()
        .filter_map(|field| {
            values
                .get(field.as_str())
                .map(|value| format!("{:<14} {}", field.as_str(), display_value(value)))
        })
        .collect()
}

pub fn format_sync_timestamp(timestamp_ms: i64) -> String {
    Utc.timestamp_millis_opt(timestamp_ms).single().map_or_else(
        || timestamp_ms.to_string(),
        |datetime| datetime.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    )
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
