use std::path::Path;

use maxnote_core::models::{SettingsField, UserSettings};
use maxnote_core::sync::detect_conflicts;
use serde::Serialize;

use crate::cli::Resolution;
use crate::commands::common::{
    conflict_resolution, format_sync_timestamp, read_snapshot, AppContext,
};
use crate::commands::settings::report_outcome;
use crate::error::CliError;

#[derive(Debug, Serialize)]
pub struct ConflictItem {
    pub field: SettingsField,
    pub local: Option<serde_json::Value>,
    pub remote: Option<serde_json::Value>,
}

pub async fn run_sync(
    remote_path: Option<&Path>,
    as_json: bool,
    ctx: &AppContext,
) -> Result<(), CliError> {
    let remote = remote_path.map(read_snapshot).transpose()?;
    let store = ctx.open_store();
    let sync = ctx.open_sync(remote);

    let result = sync.sync_with_server(store.settings()).await;
    if as_json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    }
    if !result.success {
        return Err(CliError::SyncFailed(result.error.unwrap_or_default()));
    }
    if as_json {
        return Ok(());
    }

    if let Some(timestamp) = sync.last_sync() {
        println!("Sync completed at {}", format_sync_timestamp(timestamp));
    }
    match result.conflicts {
        Some(conflicts) if !conflicts.is_empty() => {
            let names: Vec<&str> = conflicts.iter().map(|field| field.as_str()).collect();
            println!("Conflicting fields: {}", names.join(", "));
            println!("Run `maxnote conflicts --resolve <local|remote|merge>` to settle them.");
        }
        _ => println!("No conflicts"),
    }
    Ok(())
}

pub fn run_conflicts(
    remote_path: Option<&Path>,
    resolve: Option<Resolution>,
    as_json: bool,
    ctx: &AppContext,
) -> Result<(), CliError> {
    let sync = ctx.open_sync(None);
    let remote = match remote_path {
        Some(path) => read_snapshot(path)?,
        None => sync.pending_remote().ok_or(CliError::NoRemoteSnapshot)?,
    };

    let mut store = ctx.open_store();
    let conflicts = detect_conflicts(store.settings(), &remote);

    let Some(resolution) = resolve else {
        let items = conflict_items(&conflicts, store.settings(), &remote);
        if as_json {
            println!("{}", serde_json::to_string_pretty(&items)?);
        } else if items.is_empty() {
            println!("No conflicts");
        } else {
            for line in format_conflict_lines(&items) {
                println!("{line}");
            }
        }
        return Ok(());
    };

    let resolution = conflict_resolution(resolution);
    let outcome = store.apply_resolutions(&conflicts, resolution, &remote)?;
    report_outcome(&outcome);
    if remote_path.is_none() {
        sync.clear_pending_remote();
    }
    println!(
        "Resolved {} conflict(s) with strategy {}",
        conflicts.len(),
        resolution
    );
    Ok(())
}

pub fn conflict_items(
    conflicts: &[SettingsField],
    local: &UserSettings,
    remote: &UserSettings,
) -> Vec<ConflictItem> {
    conflicts
        .iter()
        .map(|field| ConflictItem {
            field: *field,
            local: local.field_value(*field),
            remote: remote.field_value(*field),
        })
        .collect()
}

pub fn format_conflict_lines(items: &[ConflictItem]) -> Vec<String> {
    let render = |value: &Option<serde_json::Value>| {
        value
            .as_ref()
            .map_or_else(|| "(unset)".to_string(), ToString::to_string)
    };
    items
        .iter()
        .map(|item| {
            format!(
                "{}  local={}  remote={}",
                item.field,
                render(&item.local),
                render(&item.remote)
            )
        })
        .collect()
}
