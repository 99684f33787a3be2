//! Closed set of settings field names

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A known `UserSettings` field.
///
/// Used as the key for validation errors, conflict lists and CSV rows so
/// field names are checked at compile time instead of passed around as
/// free-form strings. Serialized with the persisted camelCase key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SettingsField {
    DisplayName,
    Bio,
    Phone,
    AvatarUrl,
    Theme,
    Language,
    Timezone,
    Notifications,
    AutoSync,
    AutoBackup,
    FontSize,
    HighContrast,
    ReduceMotion,
    ScreenReader,
    ExportFormat,
    RetentionDays,
}

impl SettingsField {
    /// Every field in declaration order; also the conflict iteration order.
    pub const ALL: [Self; 16] = [
        Self::DisplayName,
        Self::Bio,
        Self::Phone,
        Self::AvatarUrl,
        Self::Theme,
        Self::Language,
        Self::Timezone,
        Self::Notifications,
        Self::AutoSync,
        Self::AutoBackup,
        Self::FontSize,
        Self::HighContrast,
        Self::ReduceMotion,
        Self::ScreenReader,
        Self::ExportFormat,
        Self::RetentionDays,
    ];

    /// Persisted key of this field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DisplayName => "displayName",
            Self::Bio => "bio",
            Self::Phone => "phone",
            Self::AvatarUrl => "avatarUrl",
            Self::Theme => "theme",
            Self::Language => "language",
            Self::Timezone => "timezone",
            Self::Notifications => "notifications",
            Self::AutoSync => "autoSync",
            Self::AutoBackup => "autoBackup",
            Self::FontSize => "fontSize",
            Self::HighContrast => "highContrast",
            Self::ReduceMotion => "reduceMotion",
            Self::ScreenReader => "screenReader",
            Self::ExportFormat => "exportFormat",
            Self::RetentionDays => "retentionDays",
        }
    }

    /// Human readable label used in validation messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::DisplayName => "Nome de exibição",
            Self::Bio => "Biografia",
            Self::Phone => "Telefone",
            Self::AvatarUrl => "Avatar",
            Self::Theme => "Tema",
            Self::Language => "Idioma",
            Self::Timezone => "Fuso horário",
            Self::Notifications => "Notificações",
            Self::AutoSync => "Sincronização automática",
            Self::AutoBackup => "Backup automático",
            Self::FontSize => "Tamanho da fonte",
            Self::HighContrast => "Alto contraste",
            Self::ReduceMotion => "Reduzir movimento",
            Self::ScreenReader => "Leitor de tela",
            Self::ExportFormat => "Formato de exportação",
            Self::RetentionDays => "Dias de retenção",
        }
    }

    /// Interpret raw text typed by the user as this field's JSON value.
    ///
    /// Input that does not fit the field's type is kept as a string so the
    /// validation rules can report it.
    pub fn parse_input(self, raw: &str) -> Value {
        let trimmed = raw.trim();
        match self {
            Self::RetentionDays => trimmed
                .parse::<i64>()
                .map_or_else(|_| Value::String(raw.to_string()), Value::from),
            Self::AutoSync
            | Self::AutoBackup
            | Self::HighContrast
            | Self::ReduceMotion
            | Self::ScreenReader => match trimmed.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Value::Bool(true),
                "0" | "false" | "no" | "off" => Value::Bool(false),
                _ => Value::String(raw.to_string()),
            },
            Self::Notifications => serde_json::from_str(trimmed)
                .unwrap_or_else(|_| Value::String(raw.to_string())),
            _ => Value::String(raw.to_string()),
        }
    }
}

impl fmt::Display for SettingsField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a known settings field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown settings field: {0}")]
pub struct ParseFieldError(pub String);

impl FromStr for SettingsField {
    type Err = ParseFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == trimmed)
            .ok_or_else(|| ParseFieldError(trimmed.to_string()))
    }
}
