//! Settings export/import artifacts shared by the store and the cache layer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::models::{SettingsField, UserSettings};

const CSV_HEADER: [&str; 4] = ["Campo", "Valor", "Tipo", "Descrição"];

/// Artifact format for settings export/import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotFormat {
    Json,
    Csv,
}

impl SnapshotFormat {
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }

    /// Guess the format from a file name, defaulting to JSON.
    pub fn from_path(path: &std::path::Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => Self::Csv,
            _ => Self::Json,
        }
    }
}

impl fmt::Display for SnapshotFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for SnapshotFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(Error::InvalidInput(format!(
                "unsupported settings format '{other}' (expected json or csv)"
            ))),
        }
    }
}

/// Render settings as pretty-printed JSON.
pub fn render_json_export(settings: &UserSettings) -> Result<String> {
    Ok(serde_json::to_string_pretty(settings)?)
}

/// Render settings as CSV: a header row, then one row per set field with its
/// JSON-encoded value, type name and a description.
///
/// Every row has four columns only under RFC 4180 quoting: values such as the
/// `notifications` object contain commas and are written quoted, so the
/// output must be read with a CSV parser, not split on commas.
pub fn render_csv_export(settings: &UserSettings) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;

    let values = settings.field_map();
    for field in SettingsField::ALL {
        let Some(value) = values.get(field.as_str()) else {
            continue;
        };
        let encoded = serde_json::to_string(value)?;
        let description = format!("Configuração de {}", field.label());
        writer.write_record([
            field.as_str(),
            encoded.as_str(),
            value_type_name(&value),
            description.as_str(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|error| Error::Io(error.into_error()))?;
    String::from_utf8(bytes).map_err(|error| Error::InvalidInput(error.to_string()))
}

pub fn render_settings_export(settings: &UserSettings, format: SnapshotFormat) -> Result<String> {
    match format {
        SnapshotFormat::Json => render_json_export(settings),
        SnapshotFormat::Csv => render_csv_export(settings),
    }
}

/// Parse an exported JSON object into a raw field map.
pub fn parse_json_import(content: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str::<Value>(content)? {
        Value::Object(map) => Ok(map),
        other => Err(Error::InvalidInput(format!(
            "settings import must be a JSON object, got {}",
            value_type_name(&other)
        ))),
    }
}

/// Parse an exported CSV artifact into a raw field map.
///
/// Values that are not valid JSON are kept as plain strings. Rows naming an
/// unknown field are skipped.
pub fn parse_csv_import(content: &str) -> Result<Map<String, Value>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut map = Map::new();
    for record in reader.records() {
        let record = record?;
        let (Some(name), Some(raw)) = (record.get(0), record.get(1)) else {
            continue;
        };
        let Ok(field) = name.parse::<SettingsField>() else {
            tracing::warn!("Skipping unknown settings field in CSV import: {}", name);
            continue;
        };
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        map.insert(field.as_str().to_string(), value);
    }
    Ok(map)
}

pub fn parse_settings_import(content: &str, format: SnapshotFormat) -> Result<Map<String, Value>> {
    match format {
        SnapshotFormat::Json => parse_json_import(content),
        SnapshotFormat::Csv => parse_csv_import(content),
    }
}

/// Build a deterministic default file name for export flows.
#[must_use]
pub fn suggested_export_file_name(format: SnapshotFormat, timestamp_ms: i64) -> String {
    format!("maxnote-settings-{timestamp_ms}.{}", format.extension())
}

const fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::String(_) => "string",
        Value::Number(_) => "number",
        Value::Bool(_) => "boolean",
        Value::Null | Value::Array(_) | Value::Object(_) => "object",
    }
}
