//! Shared status types surfaced to front ends.

use serde::Serialize;

use crate::validation::ValidationErrors;

/// Sync state of a `SettingsSync`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncState {
    Offline,
    Syncing,
    Synced,
    Error,
}

/// Non-fatal problems of the settings store, rendered as status messages.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStatus {
    /// The persisted blob was unreadable and defaults were used instead.
    pub load_error: Option<String>,
    /// Errors of the most recently rejected update or import.
    pub validation_errors: ValidationErrors,
    /// The last write to storage failed; memory state is still current.
    pub persist_error: Option<String>,
}

impl StoreStatus {
    pub fn is_ok(&self) -> bool {
        self.load_error.is_none() && self.validation_errors.is_empty() && self.persist_error.is_none()
    }
}

/// Whether a successful mutation also reached storage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PersistOutcome {
    Saved,
    /// Applied in memory only; carries the storage error message.
    Unsaved(String),
}

impl PersistOutcome {
    pub const fn is_saved(&self) -> bool {
        matches!(self, Self::Saved)
    }
}
