//! Data models for MaxNote

mod field;
mod settings;

pub use field::{ParseFieldError, SettingsField};
pub use settings::{
    ExportFormat, FontSize, NotificationPreferences, SettingsPatch, ThemeMode, UserSettings,
    DEFAULT_RETENTION_DAYS,
};
