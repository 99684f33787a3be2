//! Declarative field validation.
//!
//! One rule per validated field. Rules operate on raw JSON values so the same
//! table serves typed patches, imported files and live form input.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::models::{SettingsField, SettingsPatch, UserSettings};

const DISPLAY_NAME_MIN_CHARS: usize = 2;
const DISPLAY_NAME_MAX_CHARS: usize = 50;
const BIO_MAX_CHARS: usize = 500;
const PHONE_MIN_DIGITS: usize = 10;
const PHONE_MAX_DIGITS: usize = 15;
const RETENTION_MIN_DAYS: i64 = 1;
const RETENTION_MAX_DAYS: i64 = 3650;
const EXPORT_FORMATS: [&str; 3] = ["json", "pdf", "csv"];

/// A single validation rule.
#[derive(Debug, Clone, Copy)]
pub struct ValidationRule {
    pub field: SettingsField,
    pub required: bool,
    check: fn(&Value) -> Option<String>,
}

impl ValidationRule {
    /// Run the rule against a value that may be absent.
    pub fn validate(&self, value: Option<&Value>) -> Option<String> {
        if is_blank(value) {
            return self
                .required
                .then(|| format!("{} é obrigatório", self.field.label()));
        }
        value.and_then(self.check)
    }
}

/// The rule table. Fields without an entry accept any well-typed value.
pub const RULES: [ValidationRule; 7] = [
    ValidationRule {
        field: SettingsField::DisplayName,
        required: true,
        check: check_display_name,
    },
    ValidationRule {
        field: SettingsField::Phone,
        required: false,
        check: check_phone,
    },
    ValidationRule {
        field: SettingsField::Bio,
        required: false,
        check: check_bio,
    },
    ValidationRule {
        field: SettingsField::Language,
        required: true,
        check: check_language,
    },
    ValidationRule {
        field: SettingsField::Timezone,
        required: true,
        check: check_timezone,
    },
    ValidationRule {
        field: SettingsField::ExportFormat,
        required: true,
        check: check_export_format,
    },
    ValidationRule {
        field: SettingsField::RetentionDays,
        required: true,
        check: check_retention_days,
    },
];

/// Field to message mapping; empty means valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<SettingsField, String>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: SettingsField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: SettingsField) -> bool {
        self.0.contains_key(&field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (SettingsField, &str)> + '_ {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    fn insert(&mut self, field: SettingsField, message: String) {
        self.0.insert(field, message);
    }

    fn remove(&mut self, field: SettingsField) {
        self.0.remove(&field);
    }

    fn clear(&mut self) {
        self.0.clear();
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (field, message)) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
        }
        Ok(())
    }
}

pub fn rule_for(field: SettingsField) -> Option<&'static ValidationRule> {
    RULES.iter().find(|rule| rule.field == field)
}

/// Validate one field value; `None` means valid.
pub fn validate_field(field: SettingsField, value: Option<&Value>) -> Option<String> {
    rule_for(field).and_then(|rule| rule.validate(value))
}

/// Validate the fields present in `record`.
///
/// Absent fields are not checked, so a partial update only has to be valid
/// for what it changes. Use `validate_settings` for a full-record check.
pub fn validate_all(record: &Map<String, Value>) -> ValidationErrors {
    let mut errors = ValidationErrors::default();
    for rule in &RULES {
        let key = rule.field.as_str();
        if !record.contains_key(key) {
            continue;
        }
        if let Some(message) = rule.validate(record.get(key)) {
            errors.insert(rule.field, message);
        }
    }
    errors
}

/// Validate the fields present in `patch`. A patch that cannot be turned
/// into a field map is an error, never an empty (valid) result.
pub fn validate_patch(patch: &SettingsPatch) -> serde_json::Result<ValidationErrors> {
    Ok(validate_all(&patch.to_json_map()?))
}

/// Validate every rule against a complete record, required fields included.
pub fn validate_settings(settings: &UserSettings) -> ValidationErrors {
    let values = settings.field_map();
    let mut errors = ValidationErrors::default();
    for rule in &RULES {
        if let Some(message) = rule.validate(values.get(rule.field.as_str())) {
            errors.insert(rule.field, message);
        }
    }
    errors
}

/// Current per-field errors of a form being edited.
#[derive(Debug, Clone, Default)]
pub struct FieldFeedback {
    errors: ValidationErrors,
}

impl FieldFeedback {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-validate `field` with its latest value and return the message, if any.
    pub fn touch(&mut self, field: SettingsField, value: Option<&Value>) -> Option<&str> {
        match validate_field(field, value) {
            Some(message) => self.errors.insert(field, message),
            None => self.errors.remove(field),
        }
        self.errors.get(field)
    }

    pub fn clear(&mut self, field: SettingsField) {
        self.errors.remove(field);
    }

    pub fn clear_all(&mut self) {
        self.errors.clear();
    }

    pub const fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(text)) => text.trim().is_empty(),
        Some(_) => false,
    }
}

fn regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("Invalid regex"))
}

fn expect_text(field: SettingsField, value: &Value) -> Result<&str, String> {
    value
        .as_str()
        .ok_or_else(|| format!("{} deve ser um texto", field.label()))
}

fn check_display_name(value: &Value) -> Option<String> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let text = match expect_text(SettingsField::DisplayName, value) {
        Ok(text) => text.trim(),
        Err(message) => return Some(message),
    };

    let length = text.chars().count();
    if length < DISPLAY_NAME_MIN_CHARS {
        return Some(format!(
            "Nome de exibição deve ter pelo menos {DISPLAY_NAME_MIN_CHARS} caracteres"
        ));
    }
    if length > DISPLAY_NAME_MAX_CHARS {
        return Some(format!(
            "Nome de exibição deve ter no máximo {DISPLAY_NAME_MAX_CHARS} caracteres"
        ));
    }
    if !regex(&PATTERN, r"^[a-zA-ZÀ-ÿ\s'-]+$").is_match(text) {
        return Some(
            "Nome de exibição pode conter apenas letras, espaços, hífens e apóstrofos".to_string(),
        );
    }
    None
}

fn check_phone(value: &Value) -> Option<String> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let text = match expect_text(SettingsField::Phone, value) {
        Ok(text) => text.trim(),
        Err(message) => return Some(message),
    };

    if !regex(&PATTERN, r"^[\d\s()+-]+$").is_match(text) {
        return Some("Telefone contém caracteres inválidos".to_string());
    }
    let digits = text.chars().filter(char::is_ascii_digit).count();
    if !(PHONE_MIN_DIGITS..=PHONE_MAX_DIGITS).contains(&digits) {
        return Some(format!(
            "Telefone deve ter entre {PHONE_MIN_DIGITS} e {PHONE_MAX_DIGITS} dígitos"
        ));
    }
    None
}

fn check_bio(value: &Value) -> Option<String> {
    static SCRIPT: OnceLock<Regex> = OnceLock::new();
    static JS_SCHEME: OnceLock<Regex> = OnceLock::new();
    static EVENT_HANDLER: OnceLock<Regex> = OnceLock::new();
    let text = match expect_text(SettingsField::Bio, value) {
        Ok(text) => text,
        Err(message) => return Some(message),
    };

    if text.chars().count() > BIO_MAX_CHARS {
        return Some(format!(
            "Biografia deve ter no máximo {BIO_MAX_CHARS} caracteres"
        ));
    }
    let unsafe_content = regex(&SCRIPT, r"(?is)<script\b[^>]*>.*?</script\s*>").is_match(text)
        || regex(&JS_SCHEME, r"(?i)javascript\s*:").is_match(text)
        || regex(&EVENT_HANDLER, r"(?i)\bon[a-z]+\s*=").is_match(text);
    if unsafe_content {
        return Some("Biografia contém conteúdo não permitido".to_string());
    }
    None
}

fn check_language(value: &Value) -> Option<String> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let text = match expect_text(SettingsField::Language, value) {
        Ok(text) => text.trim(),
        Err(message) => return Some(message),
    };

    (!regex(&PATTERN, r"^[a-z]{2}-[A-Z]{2}$").is_match(text))
        .then(|| "Idioma deve seguir o formato xx-XX".to_string())
}

fn check_timezone(value: &Value) -> Option<String> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let text = match expect_text(SettingsField::Timezone, value) {
        Ok(text) => text.trim(),
        Err(message) => return Some(message),
    };

    (!regex(&PATTERN, r"^[A-Za-z_/]+$").is_match(text))
        .then(|| "Fuso horário inválido".to_string())
}

fn check_export_format(value: &Value) -> Option<String> {
    let text = match expect_text(SettingsField::ExportFormat, value) {
        Ok(text) => text,
        Err(message) => return Some(message),
    };

    (!EXPORT_FORMATS.contains(&text)).then(|| {
        format!(
            "Formato de exportação deve ser um de: {}",
            EXPORT_FORMATS.join(", ")
        )
    })
}

fn check_retention_days(value: &Value) -> Option<String> {
    let Some(days) = value.as_i64() else {
        return Some("Dias de retenção deve ser um número inteiro".to_string());
    };

    (!(RETENTION_MIN_DAYS..=RETENTION_MAX_DAYS).contains(&days)).then(|| {
        format!("Dias de retenção deve estar entre {RETENTION_MIN_DAYS} e {RETENTION_MAX_DAYS}")
    })
}
