//! Settings sync with a remote endpoint.
//!
//! The remote side is a `SyncTransport`; `SimulatedTransport` stands in for
//! a backend until one exists. At most one sync runs at a time per
//! `SettingsSync`: an overlapping call returns immediately with a failed
//! result instead of queueing.

mod conflict;

pub use conflict::{detect_conflicts, resolve_all, resolve_conflict, ConflictResolution};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cache::SettingsCache;
use crate::config::SettingsConfig;
use crate::error::{Error, Result};
use crate::export::{parse_settings_import, render_settings_export, SnapshotFormat};
use crate::models::{SettingsField, SettingsPatch, UserSettings};
use crate::state::SyncState;
use crate::storage::KeyValueStore;
use crate::util::unix_timestamp_millis;
use crate::validation::validate_all;

pub const SYNC_IN_PROGRESS: &str = "Sync already in progress";

/// Cache key of the snapshot mirrored by the settings store.
pub const CURRENT_KEY: &str = "current";
const BACKUP_KEY: &str = "backup";
const REMOTE_KEY: &str = "remote";
const LAST_SYNC_KEY: &str = "lastSync";

/// Outcome of one sync attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conflicts: Option<Vec<SettingsField>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SyncResult {
    pub const fn succeeded(conflicts: Option<Vec<SettingsField>>) -> Self {
        Self {
            success: true,
            conflicts,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            conflicts: None,
            error: Some(error.into()),
        }
    }
}

/// Remote end of a settings sync.
#[allow(async_fn_in_trait)]
pub trait SyncTransport {
    /// Push `local` and return the remote snapshot when the remote holds one
    /// that may differ, `Ok(None)` when the remote simply accepted it.
    async fn exchange(
        &self,
        local: &UserSettings,
    ) -> std::result::Result<Option<UserSettings>, String>;
}

/// Fixed-delay stand-in for a backend round trip.
#[derive(Debug, Clone, Default)]
pub struct SimulatedTransport {
    delay: Duration,
    remote: Option<UserSettings>,
}

impl SimulatedTransport {
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            remote: None,
        }
    }

    /// Report `remote` as the server-side snapshot after each round trip.
    #[must_use]
    pub fn with_remote(mut self, remote: UserSettings) -> Self {
        self.remote = Some(remote);
        self
    }
}

impl SyncTransport for SimulatedTransport {
    async fn exchange(
        &self,
        _local: &UserSettings,
    ) -> std::result::Result<Option<UserSettings>, String> {
        tokio::time::sleep(self.delay).await;
        Ok(self.remote.clone())
    }
}

/// Clears the in-flight flag on every exit path, unwinding included.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct SettingsSync<S: KeyValueStore, T: SyncTransport> {
    cache: SettingsCache<S>,
    transport: T,
    in_flight: AtomicBool,
    state: Mutex<SyncState>,
}

impl<S: KeyValueStore, T: SyncTransport> SettingsSync<S, T> {
    pub fn new(store: S, config: &SettingsConfig, transport: T) -> Self {
        Self {
            cache: SettingsCache::new(store, config),
            transport,
            in_flight: AtomicBool::new(false),
            state: Mutex::new(SyncState::Offline),
        }
    }

    pub const fn cache(&self) -> &SettingsCache<S> {
        &self.cache
    }

    pub fn is_syncing(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn state(&self) -> SyncState {
        self.state.lock().map_or(SyncState::Error, |state| *state)
    }

    /// Back up `settings`, run one round trip and report the outcome.
    ///
    /// Conflicts with a returned remote snapshot are reported in the result;
    /// they do not make the sync fail.
    pub async fn sync_with_server(&self, settings: &UserSettings) -> SyncResult {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("Rejected sync request while another sync is in flight");
            return SyncResult::failed(SYNC_IN_PROGRESS);
        }
        let _guard = InFlightGuard(&self.in_flight);
        self.set_state(SyncState::Syncing);

        if !self.cache.save(BACKUP_KEY, settings) {
            tracing::warn!("Pre-sync settings backup could not be stored");
        }

        let result = match self.transport.exchange(settings).await {
            Ok(remote) => {
                self.cache.save(LAST_SYNC_KEY, &unix_timestamp_millis());
                let conflicts = remote.and_then(|remote| {
                    let conflicts = detect_conflicts(settings, &remote);
                    if conflicts.is_empty() {
                        return None;
                    }
                    self.cache.save(REMOTE_KEY, &remote);
                    Some(conflicts)
                });
                tracing::info!(
                    "Settings sync completed with {} conflict(s)",
                    conflicts.as_ref().map_or(0, Vec::len)
                );
                SyncResult::succeeded(conflicts)
            }
            Err(error) => {
                tracing::warn!("Settings sync failed: {}", error);
                SyncResult::failed(error)
            }
        };

        self.set_state(if result.success {
            SyncState::Synced
        } else {
            SyncState::Error
        });
        result
    }

    /// Snapshot saved right before the most recent sync.
    pub fn restore_backup(&self) -> Option<UserSettings> {
        self.cache.load(BACKUP_KEY)
    }

    /// Remote snapshot that conflicted during the last sync, if any.
    pub fn pending_remote(&self) -> Option<UserSettings> {
        self.cache.load(REMOTE_KEY)
    }

    pub fn clear_pending_remote(&self) {
        self.cache.clear(Some(REMOTE_KEY));
    }

    /// Time of the last successful sync (Unix ms).
    pub fn last_sync(&self) -> Option<i64> {
        self.cache.load(LAST_SYNC_KEY)
    }

    /// Render the cached current snapshot.
    pub fn export_cached(&self, format: SnapshotFormat) -> Result<String> {
        let snapshot = self
            .cache
            .load::<UserSettings>(CURRENT_KEY)
            .ok_or_else(|| Error::InvalidInput("no cached settings snapshot".to_string()))?;
        render_settings_export(&snapshot, format)
    }

    /// Parse an artifact and overlay it on the cached current snapshot.
    pub fn import_cached(&self, content: &str, format: SnapshotFormat) -> Result<UserSettings> {
        let map = parse_settings_import(content, format)?;
        let errors = validate_all(&map);
        if !errors.is_empty() {
            return Err(Error::Validation(errors));
        }
        let patch: SettingsPatch = serde_json::from_value(Value::Object(map))?;

        let mut snapshot = self
            .cache
            .load::<UserSettings>(CURRENT_KEY)
            .unwrap_or_default();
        patch.apply_to(&mut snapshot);
        if !self.cache.save(CURRENT_KEY, &snapshot) {
            return Err(Error::InvalidInput(
                "imported settings could not be cached".to_string(),
            ));
        }
        Ok(snapshot)
    }

    fn set_state(&self, next: SyncState) {
        if let Ok(mut state) = self.state.lock() {
            *state = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::ThemeMode;
    use crate::storage::MemoryStore;

    fn simulated(delay_ms: u64) -> SettingsSync<MemoryStore, SimulatedTransport> {
        SettingsSync::new(
            MemoryStore::new(),
            &SettingsConfig::default(),
            SimulatedTransport::new(Duration::from_millis(delay_ms)),
        )
    }

    /// Fails the first `failures` exchanges, then succeeds.
    struct FlakyTransport {
        failures: usize,
        calls: AtomicUsize,
    }

    impl SyncTransport for FlakyTransport {
        async fn exchange(
            &self,
            _local: &UserSettings,
        ) -> std::result::Result<Option<UserSettings>, String> {
            tokio::time::sleep(Duration::from_millis(5)).await;
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err("network unreachable".to_string())
            } else {
                Ok(None)
            }
        }
    }

    #[tokio::test]
    async fn sync_succeeds_and_records_timestamp() {
        let sync = simulated(1);
        let settings = UserSettings::default();

        let result = sync.sync_with_server(&settings).await;

        assert_eq!(result, SyncResult::succeeded(None));
        assert!(sync.last_sync().is_some());
        assert_eq!(sync.restore_backup(), Some(settings));
        assert_eq!(sync.state(), SyncState::Synced);
        assert!(!sync.is_syncing());
    }

    #[tokio::test]
    async fn overlapping_sync_is_rejected() {
        let sync = simulated(20);
        let settings = UserSettings::default();

        let (first, second) = tokio::join!(
            sync.sync_with_server(&settings),
            sync.sync_with_server(&settings)
        );

        assert!(first.success);
        assert_eq!(second, SyncResult::failed("Sync already in progress"));

        let third = sync.sync_with_server(&settings).await;
        assert!(third.success);
    }

    #[tokio::test]
    async fn failed_sync_releases_guard() {
        let sync = SettingsSync::new(
            MemoryStore::new(),
            &SettingsConfig::default(),
            FlakyTransport {
                failures: 1,
                calls: AtomicUsize::new(0),
            },
        );
        let settings = UserSettings::default();

        let failed = sync.sync_with_server(&settings).await;
        assert_eq!(failed, SyncResult::failed("network unreachable"));
        assert_eq!(sync.state(), SyncState::Error);
        assert!(sync.last_sync().is_none());
        assert!(!sync.is_syncing());

        let retried = sync.sync_with_server(&settings).await;
        assert!(retried.success);
    }

    #[tokio::test]
    async fn remote_differences_are_reported_as_conflicts() {
        let remote = UserSettings {
            theme: ThemeMode::Light,
            ..UserSettings::default()
        };
        let sync = SettingsSync::new(
            MemoryStore::new(),
            &SettingsConfig::default(),
            SimulatedTransport::new(Duration::ZERO).with_remote(remote.clone()),
        );
        let local = UserSettings {
            theme: ThemeMode::Dark,
            ..UserSettings::default()
        };

        let result = sync.sync_with_server(&local).await;

        assert!(result.success);
        assert_eq!(result.conflicts, Some(vec![SettingsField::Theme]));
        assert_eq!(sync.pending_remote(), Some(remote));

        sync.clear_pending_remote();
        assert_eq!(sync.pending_remote(), None);
    }

    #[test]
    fn export_cached_requires_snapshot() {
        let sync = simulated(0);
        assert!(sync.export_cached(SnapshotFormat::Json).is_err());
    }

    #[test]
    fn import_cached_overlays_and_exports() {
        let sync = simulated(0);
        let csv = "Campo,Valor,Tipo,Descrição\ndisplayName,Ana,string,x\nretentionDays,30,number,x\n";

        let imported = sync.import_cached(csv, SnapshotFormat::Csv).unwrap();
        assert_eq!(imported.display_name, "Ana");
        assert_eq!(imported.retention_days, 30);

        let exported = sync.export_cached(SnapshotFormat::Json).unwrap();
        let parsed: UserSettings = serde_json::from_str(&exported).unwrap();
        assert_eq!(parsed, imported);
    }

    #[test]
    fn import_cached_rejects_invalid_values() {
        let sync = simulated(0);
        let error = sync
            .import_cached(r#"{ "retentionDays": 0 }"#, SnapshotFormat::Json)
            .unwrap_err();

        match error {
            Error::Validation(errors) => assert!(errors.contains(SettingsField::RetentionDays)),
            other => panic!("unexpected error: {other}"),
        }
        assert!(sync.cache().load::<UserSettings>(CURRENT_KEY).is_none());
    }
}
