use std::path::Path;

use maxnote_core::export::{suggested_export_file_name, SnapshotFormat};
use maxnote_core::util::unix_timestamp_millis;

use crate::cli::ArtifactFormat;
use crate::commands::common::{snapshot_format, AppContext};
use crate::commands::settings::report_outcome;
use crate::error::CliError;

pub fn run_export(
    format: ArtifactFormat,
    output_path: Option<&Path>,
    cached: bool,
    ctx: &AppContext,
) -> Result<(), CliError> {
    let format = snapshot_format(format);
    let rendered = if cached {
        ctx.open_sync(None).export_cached(format)?
    } else {
        ctx.open_store().export_settings(format)?
    };

    if let Some(path) = output_path {
        // A directory gets a timestamped file name.
        let path = if path.is_dir() {
            path.join(suggested_export_file_name(format, unix_timestamp_millis()))
        } else {
            path.to_path_buf()
        };
        std::fs::write(&path, rendered)?;
        println!("{}", path.display());
    } else {
        println!("{rendered}");
    }

    Ok(())
}

pub fn run_import(
    path: &Path,
    format: Option<ArtifactFormat>,
    ctx: &AppContext,
) -> Result<(), CliError> {
    let format = format.map_or_else(|| SnapshotFormat::from_path(path), snapshot_format);
    let content = std::fs::read_to_string(path)?;

    let mut store = ctx.open_store();
    let outcome = store.import_settings_text(&content, format)?;
    report_outcome(&outcome);
    println!("Imported settings from {}", path.display());
    Ok(())
}
