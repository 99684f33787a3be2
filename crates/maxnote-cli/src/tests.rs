use std::path::PathBuf;

use maxnote_core::config::SettingsConfig;
use maxnote_core::models::{SettingsField, ThemeMode, UserSettings};
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::cli::{ArtifactFormat, Resolution};
use crate::commands::common::{
    format_settings_lines, format_sync_timestamp, parse_field_pair, read_snapshot, AppContext,
};
use crate::commands::export::{run_export, run_import};
use crate::commands::settings::{run_reset, run_set, run_validate};
use crate::commands::sync::{conflict_items, format_conflict_lines, run_conflicts, run_sync};
use crate::error::CliError;

fn test_context(dir: &tempfile::TempDir) -> AppContext {
    let config = SettingsConfig {
        sync_delay_ms: 0,
        ..SettingsConfig::default()
    };
    AppContext::new(dir.path().join("storage.json"), config)
}

fn write_remote(dir: &tempfile::TempDir, value: &serde_json::Value) -> PathBuf {
    let path = dir.path().join("remote.json");
    std::fs::write(&path, value.to_string()).unwrap();
    path
}

#[test]
fn parse_field_pair_splits_on_first_equals() {
    let (field, value) = parse_field_pair("bio=a=b").unwrap();
    assert_eq!(field, SettingsField::Bio);
    assert_eq!(value, json!("a=b"));

    let (field, value) = parse_field_pair("retentionDays=30").unwrap();
    assert_eq!(field, SettingsField::RetentionDays);
    assert_eq!(value, json!(30));
}

#[test]
fn parse_field_pair_rejects_missing_equals_and_unknown_fields() {
    assert!(matches!(
        parse_field_pair("displayName"),
        Err(CliError::MalformedPair(_))
    ));
    assert!(matches!(
        parse_field_pair("nickname=Ana"),
        Err(CliError::UnknownField(_))
    ));
}

#[test]
fn format_sync_timestamp_renders_utc() {
    assert_eq!(format_sync_timestamp(0), "1970-01-01 00:00:00 UTC");
}

#[test]
fn format_settings_lines_skips_unset_fields() {
    let lines = format_settings_lines(&UserSettings::default());
    assert_eq!(lines.len(), SettingsField::ALL.len() - 3);
    assert!(lines[0].starts_with("displayName"));
    assert!(lines[0].ends_with("Usuário"));
    assert!(!lines.iter().any(|line| line.starts_with("bio")));
}

#[test]
fn format_conflict_lines_marks_unset_values() {
    let local = UserSettings {
        bio: Some("local bio".to_string()),
        theme: ThemeMode::Dark,
        ..UserSettings::default()
    };
    let remote = UserSettings {
        theme: ThemeMode::Light,
        ..UserSettings::default()
    };

    let items = conflict_items(&[SettingsField::Bio, SettingsField::Theme], &local, &remote);
    assert_eq!(
        format_conflict_lines(&items),
        vec![
            "bio  local=\"local bio\"  remote=(unset)".to_string(),
            "theme  local=\"dark\"  remote=\"light\"".to_string(),
        ]
    );
}

#[test]
fn run_set_persists_valid_value() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = test_context(&dir);

    run_set("displayName", "Ana Souza", &ctx).unwrap();

    assert_eq!(ctx.open_store().settings().display_name, "Ana Souza");
}

#[test]
fn run_set_rejects_invalid_value_without_saving() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = test_context(&dir);

    let error = run_set("retentionDays", "0", &ctx).unwrap_err();
    assert!(matches!(
        error,
        CliError::Core(maxnote_core::Error::Validation(_))
    ));
    assert_eq!(ctx.open_store().settings().retention_days, 365);
}

#[test]
fn run_reset_restores_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = test_context(&dir);
    run_set("theme", "dark", &ctx).unwrap();

    run_reset(&ctx).unwrap();

    assert_eq!(ctx.open_store().settings(), &UserSettings::default());
}

#[test]
fn run_validate_counts_invalid_values() {
    assert!(run_validate(&["displayName=Ana".to_string()]).is_ok());

    let result = run_validate(&[
        "displayName=A".to_string(),
        "phone=abc".to_string(),
        "language=pt-BR".to_string(),
    ]);
    assert!(matches!(result, Err(CliError::InvalidValues(2))));
}

#[test]
fn export_then_import_restores_settings_through_csv() {
    let source_dir = tempfile::tempdir().unwrap();
    let source = test_context(&source_dir);
    run_set("displayName", "Maria", &source).unwrap();
    run_set("retentionDays", "90", &source).unwrap();

    let artifact = source_dir.path().join("settings.csv");
    run_export(ArtifactFormat::Csv, Some(&artifact), false, &source).unwrap();

    let target_dir = tempfile::tempdir().unwrap();
    let target = test_context(&target_dir);
    run_import(&artifact, None, &target).unwrap();

    let store = target.open_store();
    assert_eq!(store.settings().display_name, "Maria");
    assert_eq!(store.settings().retention_days, 90);
}

#[test]
fn run_import_rejects_invalid_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = test_context(&dir);
    let artifact = dir.path().join("settings.json");
    std::fs::write(&artifact, r#"{"language":"portuguese"}"#).unwrap();

    assert!(run_import(&artifact, Some(ArtifactFormat::Json), &ctx).is_err());
    assert_eq!(ctx.open_store().settings().language, "pt-BR");
}

#[test]
fn read_snapshot_fills_missing_fields_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_remote(&dir, &json!({ "theme": "light" }));

    let snapshot = read_snapshot(&path).unwrap();
    assert_eq!(snapshot.theme, ThemeMode::Light);
    assert_eq!(snapshot.language, "pt-BR");
}

#[test]
fn run_conflicts_resolves_with_remote_values() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = test_context(&dir);
    run_set("theme", "dark", &ctx).unwrap();
    let remote = write_remote(&dir, &json!({ "theme": "light", "retentionDays": 30 }));

    run_conflicts(Some(&remote), Some(Resolution::Remote), false, &ctx).unwrap();

    let store = ctx.open_store();
    assert_eq!(store.settings().theme, ThemeMode::Light);
    assert_eq!(store.settings().retention_days, 30);
}

#[test]
fn run_conflicts_with_invalid_remote_value_changes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = test_context(&dir);
    run_set("theme", "dark", &ctx).unwrap();
    let before = std::fs::read_to_string(dir.path().join("storage.json")).unwrap();
    let remote = write_remote(&dir, &json!({ "theme": "light", "language": "portuguese" }));

    let result = run_conflicts(Some(&remote), Some(Resolution::Remote), false, &ctx);

    assert!(matches!(
        result,
        Err(CliError::Core(maxnote_core::Error::Validation(_)))
    ));
    let store = ctx.open_store();
    assert_eq!(store.settings().theme, ThemeMode::Dark);
    assert_eq!(store.settings().language, "pt-BR");
    assert_eq!(
        std::fs::read_to_string(dir.path().join("storage.json")).unwrap(),
        before
    );
}

#[test]
fn run_conflicts_without_snapshot_fails() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = test_context(&dir);

    assert!(matches!(
        run_conflicts(None, None, false, &ctx),
        Err(CliError::NoRemoteSnapshot)
    ));
}

#[tokio::test]
async fn run_sync_records_pending_remote_for_conflicts() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = test_context(&dir);
    run_set("theme", "dark", &ctx).unwrap();
    let remote = write_remote(&dir, &json!({ "theme": "light" }));

    run_sync(Some(&remote), false, &ctx).await.unwrap();

    let sync = ctx.open_sync(None);
    assert!(sync.last_sync().is_some());
    assert_eq!(
        sync.pending_remote().map(|settings| settings.theme),
        Some(ThemeMode::Light)
    );
    assert_eq!(
        sync.restore_backup().map(|settings| settings.theme),
        Some(ThemeMode::Dark)
    );

    run_conflicts(None, Some(Resolution::Local), false, &ctx).unwrap();
    assert_eq!(ctx.open_store().settings().theme, ThemeMode::Dark);
    assert!(ctx.open_sync(None).pending_remote().is_none());
}

#[test]
fn run_export_into_directory_uses_suggested_name() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = test_context(&dir);
    let out_dir = dir.path().join("exports");
    std::fs::create_dir(&out_dir).unwrap();

    run_export(ArtifactFormat::Json, Some(&out_dir), false, &ctx).unwrap();

    let names: Vec<String> = std::fs::read_dir(&out_dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names.len(), 1);
    assert!(names[0].starts_with("maxnote-settings-"));
    assert!(names[0].ends_with(".json"));
}
