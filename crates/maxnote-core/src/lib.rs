//! maxnote-core - Core library for MaxNote
//!
//! This crate contains the settings model, the validation rule table, the
//! TTL/version-aware cache, conflict detection and the settings store used by
//! every MaxNote front end.

pub mod cache;
pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod session;
pub mod state;
pub mod storage;
pub mod store;
pub mod sync;
pub mod util;
pub mod validation;

pub use error::{Error, Result};
pub use models::{SettingsField, SettingsPatch, UserSettings};
pub use store::SettingsStore;
