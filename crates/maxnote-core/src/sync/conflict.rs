//! Field-level conflict detection between two settings snapshots.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::models::{SettingsField, SettingsPatch, UserSettings};

/// Which side wins when resolving a conflicting field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictResolution {
    Local,
    Remote,
    /// `notifications` keeps a channel enabled if either side enabled it;
    /// optional text takes the remote value when present, else the local one;
    /// every other field takes the remote value.
    Merge,
}

impl fmt::Display for ConflictResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Local => "local",
            Self::Remote => "remote",
            Self::Merge => "merge",
        })
    }
}

impl FromStr for ConflictResolution {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "remote" => Ok(Self::Remote),
            "merge" => Ok(Self::Merge),
            other => Err(Error::InvalidInput(format!(
                "unknown conflict resolution '{other}' (expected local, remote or merge)"
            ))),
        }
    }
}

/// Fields whose values differ between `local` and `remote`, in
/// `SettingsField::ALL` order. Fields unset on both sides are skipped.
pub fn detect_conflicts(local: &UserSettings, remote: &UserSettings) -> Vec<SettingsField> {
    let local_values = local.field_map();
    let remote_values = remote.field_map();
    SettingsField::ALL
        .into_iter()
        .filter(|field| {
            let key = field.as_str();
            match (local_values.get(key), remote_values.get(key)) {
                (None, None) => false,
                (local_value, remote_value) => local_value != remote_value,
            }
        })
        .collect()
}

/// Settings patch applying `resolution` to a single conflicting field.
pub fn resolve_conflict(
    field: SettingsField,
    resolution: ConflictResolution,
    local: &UserSettings,
    remote: &UserSettings,
) -> Result<SettingsPatch> {
    let value = match resolution {
        ConflictResolution::Local => local.field_value(field),
        ConflictResolution::Remote => remote.field_value(field),
        ConflictResolution::Merge => merge_value(field, local, remote)?,
    };

    // An unset winner clears optional text.
    let value = value.unwrap_or_else(|| Value::String(String::new()));
    Ok(SettingsPatch::single(field, value)?)
}

/// Resolve every field in `conflicts` with the same strategy.
pub fn resolve_all(
    conflicts: &[SettingsField],
    resolution: ConflictResolution,
    local: &UserSettings,
    remote: &UserSettings,
) -> Result<SettingsPatch> {
    let mut patch = SettingsPatch::default();
    for field in conflicts {
        patch.merge(resolve_conflict(*field, resolution, local, remote)?);
    }
    Ok(patch)
}

fn merge_value(
    field: SettingsField,
    local: &UserSettings,
    remote: &UserSettings,
) -> Result<Option<Value>> {
    Ok(match field {
        SettingsField::Notifications => Some(serde_json::to_value(
            local.notifications.union(remote.notifications),
        )?),
        SettingsField::Bio | SettingsField::Phone | SettingsField::AvatarUrl => remote
            .field_value(field)
            .or_else(|| local.field_value(field)),
        _ => remote.field_value(field),
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::{FontSize, NotificationPreferences, ThemeMode};

    #[test]
    fn detects_only_differing_fields() {
        let local = UserSettings {
            theme: ThemeMode::Dark,
            font_size: FontSize::Medium,
            ..UserSettings::default()
        };
        let remote = UserSettings {
            theme: ThemeMode::Light,
            font_size: FontSize::Medium,
            ..UserSettings::default()
        };

        assert_eq!(detect_conflicts(&local, &remote), vec![SettingsField::Theme]);
    }

    #[test]
    fn identical_snapshots_have_no_conflicts() {
        let settings = UserSettings::default();
        assert!(detect_conflicts(&settings, &settings.clone()).is_empty());
    }

    #[test]
    fn conflicts_follow_fixed_field_order() {
        let local = UserSettings {
            retention_days: 30,
            bio: Some("local".to_string()),
            notifications: NotificationPreferences {
                updates: true,
                ..NotificationPreferences::default()
            },
            ..UserSettings::default()
        };
        let remote = UserSettings::default();

        assert_eq!(
            detect_conflicts(&local, &remote),
            vec![
                SettingsField::Bio,
                SettingsField::Notifications,
                SettingsField::RetentionDays
            ]
        );
    }

    #[test]
    fn optional_set_on_one_side_only_is_a_conflict() {
        let local = UserSettings {
            phone: Some("+55 11 98765-4321".to_string()),
            notifications: NotificationPreferences {
                updates: true,
                ..NotificationPreferences::default()
            },
            ..UserSettings::default()
        };
        let remote = UserSettings::default();

        assert_eq!(
            detect_conflicts(&local, &remote),
            vec![SettingsField::Phone, SettingsField::Notifications]
        );
    }

    #[test]
    fn resolve_local_and_remote_pick_a_side() {
        let local = UserSettings {
            theme: ThemeMode::Dark,
            ..UserSettings::default()
        };
        let remote = UserSettings {
            theme: ThemeMode::Light,
            ..UserSettings::default()
        };

        let patch =
            resolve_conflict(SettingsField::Theme, ConflictResolution::Local, &local, &remote)
                .unwrap();
        assert_eq!(patch.theme, Some(ThemeMode::Dark));

        let patch =
            resolve_conflict(SettingsField::Theme, ConflictResolution::Remote, &local, &remote)
                .unwrap();
        assert_eq!(patch.theme, Some(ThemeMode::Light));
        assert_eq!(patch.fields(), vec![SettingsField::Theme]);
    }

    #[test]
    fn merge_unions_notification_flags() {
        let local = UserSettings {
            notifications: NotificationPreferences {
                push: false,
                updates: true,
                ..NotificationPreferences::default()
            },
            ..UserSettings::default()
        };
        let remote = UserSettings {
            notifications: NotificationPreferences {
                push: true,
                updates: false,
                email: false,
                ..NotificationPreferences::default()
            },
            ..UserSettings::default()
        };

        let patch = resolve_conflict(
            SettingsField::Notifications,
            ConflictResolution::Merge,
            &local,
            &remote,
        )
        .unwrap();
        let merged = patch.notifications.unwrap();
        assert!(merged.push);
        assert!(merged.updates);
        assert!(merged.email);
    }

    #[test]
    fn merge_keeps_local_text_when_remote_is_unset() {
        let local = UserSettings {
            bio: Some("Escrevo todos os dias".to_string()),
            ..UserSettings::default()
        };
        let remote = UserSettings::default();

        let patch =
            resolve_conflict(SettingsField::Bio, ConflictResolution::Merge, &local, &remote)
                .unwrap();
        assert_eq!(patch.bio.as_deref(), Some("Escrevo todos os dias"));
    }

    #[test]
    fn merge_prefers_remote_for_scalars() {
        let local = UserSettings {
            retention_days: 30,
            ..UserSettings::default()
        };
        let remote = UserSettings {
            retention_days: 90,
            ..UserSettings::default()
        };

        let patch = resolve_conflict(
            SettingsField::RetentionDays,
            ConflictResolution::Merge,
            &local,
            &remote,
        )
        .unwrap();
        assert_eq!(patch.retention_days, Some(90));
    }

    #[test]
    fn choosing_unset_side_clears_optional_text() {
        let local = UserSettings::default();
        let remote = UserSettings {
            phone: Some("11987654321".to_string()),
            ..UserSettings::default()
        };

        let patch =
            resolve_conflict(SettingsField::Phone, ConflictResolution::Local, &local, &remote)
                .unwrap();
        let mut resolved = remote;
        patch.apply_to(&mut resolved);
        assert_eq!(resolved.phone, None);
    }

    #[test]
    fn resolve_all_combines_patches() {
        let local = UserSettings {
            theme: ThemeMode::Dark,
            retention_days: 30,
            ..UserSettings::default()
        };
        let remote = UserSettings::default();
        let conflicts = detect_conflicts(&local, &remote);

        let patch = resolve_all(&conflicts, ConflictResolution::Remote, &local, &remote).unwrap();
        let mut resolved = local;
        patch.apply_to(&mut resolved);
        assert_eq!(resolved, remote);
    }

    #[test]
    fn resolution_parses_from_text() {
        assert_eq!(
            "Merge".parse::<ConflictResolution>().unwrap(),
            ConflictResolution::Merge
        );
        assert!("both".parse::<ConflictResolution>().is_err());
    }
}
