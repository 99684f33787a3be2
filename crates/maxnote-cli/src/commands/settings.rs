use maxnote_core::state::PersistOutcome;
use maxnote_core::validation::FieldFeedback;
use maxnote_core::SettingsField;

use crate::commands::common::{format_settings_lines, parse_field_pair, AppContext};
use crate::error::CliError;

pub fn run_show(as_json: bool, ctx: &AppContext) -> Result<(), CliError> {
    let store = ctx.open_store();
    if as_json {
        println!("{}", serde_json::to_string_pretty(store.settings())?);
        return Ok(());
    }

    for line in format_settings_lines(store.settings()) {
        println!("{line}");
    }
    Ok(())
}

pub fn run_set(field: &str, raw_value: &str, ctx: &AppContext) -> Result<(), CliError> {
    let field = field.parse::<SettingsField>()?;
    let mut store = ctx.open_store();

    let outcome = store.update_field(field, field.parse_input(raw_value))?;
    report_outcome(&outcome);
    println!("Updated {field}");
    Ok(())
}

pub fn run_reset(ctx: &AppContext) -> Result<(), CliError> {
    let mut store = ctx.open_store();
    report_outcome(&store.reset_settings());
    println!("Settings restored to defaults");
    Ok(())
}

/// Validate each pair and print one line per field; fails if any is invalid.
pub fn run_validate(pairs: &[String]) -> Result<(), CliError> {
    let mut feedback = FieldFeedback::new();
    for pair in pairs {
        let (field, value) = parse_field_pair(pair)?;
        match feedback.touch(field, Some(&value)) {
            Some(message) => println!("{field}: {message}"),
            None => println!("{field}: ok"),
        }
    }

    if feedback.is_valid() {
        Ok(())
    } else {
        Err(CliError::InvalidValues(feedback.errors().len()))
    }
}

pub fn report_outcome(outcome: &PersistOutcome) {
    if let PersistOutcome::Unsaved(message) = outcome {
        eprintln!("Warning: change applied but not saved: {message}");
    }
}
