//! The settings store: single owner of the canonical `UserSettings`.
//!
//! Every mutation is validated first and persisted after. Load and write
//! failures never escape as errors; they degrade to defaults or to an
//! in-memory-only change and are reported through `StoreStatus`.

use serde_json::{Map, Value};

use crate::cache::SettingsCache;
use crate::config::SettingsConfig;
use crate::error::{Error, Result};
use crate::export::{parse_settings_import, render_settings_export, SnapshotFormat};
use crate::models::{SettingsField, SettingsPatch, UserSettings};
use crate::state::{PersistOutcome, StoreStatus};
use crate::storage::KeyValueStore;
use crate::sync::{resolve_all, ConflictResolution, CURRENT_KEY};
use crate::validation::{validate_all, validate_patch, ValidationErrors};

pub struct SettingsStore<S: KeyValueStore> {
    storage: S,
    cache: SettingsCache<S>,
    settings_key: String,
    settings: UserSettings,
    status: StoreStatus,
}

impl<S: KeyValueStore> SettingsStore<S> {
    /// Open a store over `storage` and load the persisted settings.
    pub fn load(storage: S, config: &SettingsConfig) -> Self {
        let mut store = Self {
            cache: SettingsCache::new(storage.clone(), config),
            storage,
            settings_key: config.settings_key().to_string(),
            settings: UserSettings::default(),
            status: StoreStatus::default(),
        };
        store.reload();
        store
    }

    /// Re-read the persisted blob, overlaying it on the defaults.
    pub fn reload(&mut self) {
        let (settings, load_error) = self.read_persisted();
        if let Some(error) = &load_error {
            tracing::warn!("Using default settings: {}", error);
        }
        self.settings = settings;
        self.status.load_error = load_error;
    }

    pub const fn settings(&self) -> &UserSettings {
        &self.settings
    }

    pub const fn status(&self) -> &StoreStatus {
        &self.status
    }

    /// Validate and merge `patch`. A single failing field rejects the whole
    /// patch and leaves the settings untouched.
    pub fn update_settings(&mut self, patch: &SettingsPatch) -> Result<PersistOutcome> {
        let errors = validate_patch(patch)?;
        self.check(errors)?;

        patch.apply_to(&mut self.settings);
        tracing::debug!("Updated settings fields {:?}", patch.fields());
        Ok(self.persist())
    }

    /// Validate and apply a single raw field value, as typed in a form.
    pub fn update_field(&mut self, field: SettingsField, value: Value) -> Result<PersistOutcome> {
        let mut record = Map::new();
        record.insert(field.as_str().to_string(), value);
        self.check(validate_all(&record))?;

        let patch: SettingsPatch = serde_json::from_value(Value::Object(record))?;
        self.update_settings(&patch)
    }

    /// Restore defaults and delete the persisted blob.
    pub fn reset_settings(&mut self) -> PersistOutcome {
        self.settings = UserSettings::default();
        self.status = StoreStatus::default();

        match self.storage.remove(&self.settings_key) {
            Ok(()) => {
                self.cache.save(CURRENT_KEY, &self.settings);
                PersistOutcome::Saved
            }
            Err(error) => {
                tracing::warn!("Failed to remove persisted settings: {}", error);
                let message = format!("Failed to remove persisted settings: {error}");
                self.status.persist_error = Some(message.clone());
                PersistOutcome::Unsaved(message)
            }
        }
    }

    /// Render the current settings; does not change any state.
    pub fn export_settings(&self, format: SnapshotFormat) -> Result<String> {
        render_settings_export(&self.settings, format)
    }

    /// Replace the settings with defaults overlaid by `data`, after the same
    /// validation as an update.
    pub fn import_settings(&mut self, data: &Map<String, Value>) -> Result<PersistOutcome> {
        self.check(validate_all(data))?;

        let patch: SettingsPatch = serde_json::from_value(Value::Object(data.clone()))?;
        self.settings = UserSettings::with_defaults(&patch);
        tracing::info!("Imported settings fields {:?}", patch.fields());
        Ok(self.persist())
    }

    /// Parse a JSON or CSV artifact and import it.
    pub fn import_settings_text(
        &mut self,
        content: &str,
        format: SnapshotFormat,
    ) -> Result<PersistOutcome> {
        let data = parse_settings_import(content, format)?;
        self.import_settings(&data)
    }

    /// Settle every conflicting field against a remote snapshot with one
    /// strategy. The resolved values are validated and applied together, so
    /// one invalid remote value leaves every field untouched.
    pub fn apply_resolutions(
        &mut self,
        conflicts: &[SettingsField],
        resolution: ConflictResolution,
        remote: &UserSettings,
    ) -> Result<PersistOutcome> {
        let patch = resolve_all(conflicts, resolution, &self.settings, remote)?;
        self.update_settings(&patch)
    }

    fn check(&mut self, errors: ValidationErrors) -> Result<()> {
        if errors.is_empty() {
            self.status.validation_errors = ValidationErrors::default();
            return Ok(());
        }
        tracing::debug!("Rejected settings change: {}", errors);
        self.status.validation_errors = errors.clone();
        Err(Error::Validation(errors))
    }

    fn read_persisted(&self) -> (UserSettings, Option<String>) {
        let raw = match self.storage.get(&self.settings_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return (UserSettings::default(), None),
            Err(error) => {
                return (
                    UserSettings::default(),
                    Some(format!("Failed to read persisted settings: {error}")),
                )
            }
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => (
                UserSettings::with_defaults(&SettingsPatch::from_json_lenient(&map)),
                None,
            ),
            Ok(_) => (
                UserSettings::default(),
                Some("Persisted settings are not a JSON object".to_string()),
            ),
            Err(error) => (
                UserSettings::default(),
                Some(format!("Failed to parse persisted settings: {error}")),
            ),
        }
    }

    fn persist(&mut self) -> PersistOutcome {
        let result = serde_json::to_string(&self.settings)
            .map_err(Error::from)
            .and_then(|serialized| {
                self.storage
                    .set(&self.settings_key, &serialized)
                    .map_err(Error::from)
            });

        match result {
            Ok(()) => {
                self.status.persist_error = None;
                self.cache.save(CURRENT_KEY, &self.settings);
                PersistOutcome::Saved
            }
            Err(error) => {
                tracing::warn!("Failed to persist settings: {}", error);
                let message = format!("Failed to save settings: {error}");
                self.status.persist_error = Some(message.clone());
                PersistOutcome::Unsaved(message)
            }
        }
    }
}
