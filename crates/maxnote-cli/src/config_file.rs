//! Config and storage file resolution for the CLI.

use std::path::{Path, PathBuf};

use maxnote_core::config::{parse_settings_config, SettingsConfig};
use maxnote_core::util::normalize_text_option;

const APP_DIR_NAME: &str = "maxnote";
const CONFIG_FILE_NAME: &str = "config.json";
const STORAGE_FILE_NAME: &str = "storage.json";

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
        .join(CONFIG_FILE_NAME)
}

pub fn default_data_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
        .join(STORAGE_FILE_NAME)
}

/// Explicit flag, then `env_value`, then the platform default.
pub fn resolve_path(
    explicit: Option<PathBuf>,
    env_value: Option<String>,
    default: impl FnOnce() -> PathBuf,
) -> PathBuf {
    explicit
        .or_else(|| normalize_text_option(env_value).map(PathBuf::from))
        .unwrap_or_else(default)
}

pub fn resolve_config_path(explicit: Option<PathBuf>) -> PathBuf {
    resolve_path(
        explicit,
        std::env::var("MAXNOTE_CONFIG").ok(),
        default_config_path,
    )
}

pub fn resolve_data_path(explicit: Option<PathBuf>) -> PathBuf {
    resolve_path(
        explicit,
        std::env::var("MAXNOTE_DATA_PATH").ok(),
        default_data_path,
    )
}

/// Load the settings config; a missing file means defaults.
pub fn load_config_from_path(path: &Path) -> Result<SettingsConfig, String> {
    if !path.exists() {
        return Ok(SettingsConfig::default());
    }

    let raw = std::fs::read_to_string(path)
        .map_err(|error| format!("Failed to read config at {}: {}", path.display(), error))?;
    parse_settings_config(&raw)
        .map_err(|error| format!("Failed to parse config at {}: {}", path.display(), error))
}
