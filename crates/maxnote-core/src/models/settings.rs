//! User settings model

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::SettingsField;
use crate::util::normalize_text_option;

/// Retention applied when the user never chose one.
pub const DEFAULT_RETENTION_DAYS: u32 = 365;

/// Theme mode options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    /// Light theme
    Light,
    /// Dark theme
    Dark,
    /// Follow system preference
    #[default]
    System,
}

/// Font size options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FontSize {
    Small,
    #[default]
    Medium,
    Large,
    ExtraLarge,
}

/// Preferred export artifact format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Json,
    Pdf,
    Csv,
}

/// Notification flags. A closed set; unknown keys are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
#[allow(clippy::struct_excessive_bools)]
pub struct NotificationPreferences {
    pub push: bool,
    pub email: bool,
    pub in_app: bool,
    pub reminders: bool,
    pub updates: bool,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            push: true,
            email: true,
            in_app: true,
            reminders: true,
            updates: false,
        }
    }
}

impl NotificationPreferences {
    /// Flag-wise OR: a channel stays enabled if either side enabled it.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self {
            push: self.push || other.push,
            email: self.email || other.email,
            in_app: self.in_app || other.in_app,
            reminders: self.reminders || other.reminders,
            updates: self.updates || other.updates,
        }
    }
}

/// Canonical user settings record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(clippy::struct_excessive_bools)]
pub struct UserSettings {
    /// Name shown in the app chrome
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub theme: ThemeMode,
    /// Locale tag such as `pt-BR`
    pub language: String,
    /// IANA-style zone name such as `America/Sao_Paulo`
    pub timezone: String,
    pub notifications: NotificationPreferences,
    pub auto_sync: bool,
    pub auto_backup: bool,
    pub font_size: FontSize,
    pub high_contrast: bool,
    pub reduce_motion: bool,
    pub screen_reader: bool,
    pub export_format: ExportFormat,
    /// Days before archived data is purged (1..=3650)
    pub retention_days: u32,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            display_name: "Usuário".to_string(),
            bio: None,
            phone: None,
            avatar_url: None,
            theme: ThemeMode::System,
            language: "pt-BR".to_string(),
            timezone: "America/Sao_Paulo".to_string(),
            notifications: NotificationPreferences::default(),
            auto_sync: true,
            auto_backup: true,
            font_size: FontSize::Medium,
            high_contrast: false,
            reduce_motion: false,
            screen_reader: false,
            export_format: ExportFormat::Json,
            retention_days: DEFAULT_RETENTION_DAYS,
        }
    }
}

impl UserSettings {
    /// Every set field keyed by persisted name. Unset optionals are absent.
    ///
    /// Serializes the whole record; callers that look at several fields
    /// should build this once rather than call `field_value` per field.
    pub fn field_map(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(mut map)) => {
                map.retain(|_, value| !value.is_null());
                map
            }
            Ok(_) => Map::new(),
            Err(error) => {
                tracing::warn!("Failed to serialize settings: {}", error);
                Map::new()
            }
        }
    }

    /// JSON value of a single field, `None` when the field is unset.
    pub fn field_value(&self, field: SettingsField) -> Option<Value> {
        self.field_map().remove(field.as_str())
    }

    /// Defaults overlaid with the present fields of `patch`.
    #[must_use]
    pub fn with_defaults(patch: &SettingsPatch) -> Self {
        let mut settings = Self::default();
        patch.apply_to(&mut settings);
        settings
    }
}

/// Partial update of `UserSettings`; absent fields are left untouched.
///
/// `retention_days` is signed so out-of-range input such as `0` or `-5`
/// can be carried to validation instead of failing to parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<ThemeMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notifications: Option<NotificationPreferences>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_sync: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_backup: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<FontSize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high_contrast: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reduce_motion: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screen_reader: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_format: Option<ExportFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retention_days: Option<i64>,
}

impl SettingsPatch {
    /// Build a patch carrying a single field.
    pub fn single(field: SettingsField, value: Value) -> serde_json::Result<Self> {
        let mut map = Map::new();
        map.insert(field.as_str().to_string(), value);
        serde_json::from_value(Value::Object(map))
    }

    /// Build a patch from a raw JSON object, keeping every field that parses.
    ///
    /// Unknown keys and fields with the wrong shape are skipped, so a stale or
    /// hand-edited blob still contributes whatever is usable.
    pub fn from_json_lenient(map: &Map<String, Value>) -> Self {
        let mut patch = Self::default();
        for field in SettingsField::ALL {
            let Some(value) = map.get(field.as_str()) else {
                continue;
            };
            match Self::single(field, value.clone()) {
                Ok(single) => patch.merge(single),
                Err(error) => {
                    tracing::warn!("Ignoring unreadable settings field {}: {}", field, error);
                }
            }
        }
        patch
    }

    /// Fields present in this patch, in declaration order.
    pub fn fields(&self) -> Vec<SettingsField> {
        self.to_json_map()
            .map(|map| {
                SettingsField::ALL
                    .into_iter()
                    .filter(|field| map.contains_key(field.as_str()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }

    /// Present fields as a JSON object keyed by persisted field name.
    pub fn to_json_map(&self) -> serde_json::Result<Map<String, Value>> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            _ => Ok(Map::new()),
        }
    }

    /// Take every field present in `other`, overriding fields already set.
    pub fn merge(&mut self, other: Self) {
        macro_rules! take {
            ($($name:ident),+ $(,)?) => {
                $(if other.$name.is_some() {
                    self.$name = other.$name;
                })+
            };
        }
        take!(
            display_name,
            bio,
            phone,
            avatar_url,
            theme,
            language,
            timezone,
            notifications,
            auto_sync,
            auto_backup,
            font_size,
            high_contrast,
            reduce_motion,
            screen_reader,
            export_format,
            retention_days,
        );
    }

    /// Shallow-merge this patch into `settings`.
    ///
    /// Blank optional text clears the field. A retention value that does not
    /// fit `u32` is ignored.
    pub fn apply_to(&self, settings: &mut UserSettings) {
        if let Some(value) = &self.display_name {
            settings.display_name = value.trim().to_string();
        }
        if let Some(value) = &self.bio {
            settings.bio = normalize_text_option(Some(value.clone()));
        }
        if let Some(value) = &self.phone {
            settings.phone = normalize_text_option(Some(value.clone()));
        }
        if let Some(value) = &self.avatar_url {
            settings.avatar_url = normalize_text_option(Some(value.clone()));
        }
        if let Some(value) = self.theme {
            settings.theme = value;
        }
        if let Some(value) = &self.language {
            settings.language = value.trim().to_string();
        }
        if let Some(value) = &self.timezone {
            settings.timezone = value.trim().to_string();
        }
        if let Some(value) = self.notifications {
            settings.notifications = value;
        }
        if let Some(value) = self.auto_sync {
            settings.auto_sync = value;
        }
        if let Some(value) = self.auto_backup {
            settings.auto_backup = value;
        }
        if let Some(value) = self.font_size {
            settings.font_size = value;
        }
        if let Some(value) = self.high_contrast {
            settings.high_contrast = value;
        }
        if let Some(value) = self.reduce_motion {
            settings.reduce_motion = value;
        }
        if let Some(value) = self.screen_reader {
            settings.screen_reader = value;
        }
        if let Some(value) = self.export_format {
            settings.export_format = value;
        }
        if let Some(days) = self.retention_days {
            match u32::try_from(days) {
                Ok(days) => settings.retention_days = days,
                Err(_) => tracing::warn!("Ignoring out-of-range retentionDays {}", days),
            }
        }
    }
}

impl From<&UserSettings> for SettingsPatch {
    fn from(settings: &UserSettings) -> Self {
        Self {
            display_name: Some(settings.display_name.clone()),
            bio: settings.bio.clone(),
            phone: settings.phone.clone(),
            avatar_url: settings.avatar_url.clone(),
            theme: Some(settings.theme),
            language: Some(settings.language.clone()),
            timezone: Some(settings.timezone.clone()),
            notifications: Some(settings.notifications),
            auto_sync: Some(settings.auto_sync),
            auto_backup: Some(settings.auto_backup),
            font_size: Some(settings.font_size),
            high_contrast: Some(settings.high_contrast),
            reduce_motion: Some(settings.reduce_motion),
            screen_reader: Some(settings.screen_reader),
            export_format: Some(settings.export_format),
            retention_days: Some(i64::from(settings.retention_days)),
        }
    }
}
