//! MaxNote CLI - inspect and manage MaxNote settings
//!
//! Drives the settings store, validation and sync core against a local
//! storage file.

mod cli;
mod commands;
mod config_file;
mod error;
#[cfg(test)]
mod tests;

use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::commands::cache::run_cache;
use crate::commands::common::AppContext;
use crate::commands::completions::run_completions;
use crate::commands::export::{run_export, run_import};
use crate::commands::settings::{run_reset, run_set, run_show, run_validate};
use crate::commands::sync::{run_conflicts, run_sync};
use crate::commands::whoami::run_whoami;
use crate::config_file::{load_config_from_path, resolve_config_path, resolve_data_path};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = "maxnote=info".parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config_path = resolve_config_path(cli.config);
    let config = load_config_from_path(&config_path).map_err(CliError::Config)?;
    let ctx = AppContext::new(resolve_data_path(cli.data_path), config);

    match cli.command {
        Commands::Show { json } => run_show(json, &ctx)?,
        Commands::Set { field, value } => run_set(&field, &value, &ctx)?,
        Commands::Reset => run_reset(&ctx)?,
        Commands::Validate { pairs } => run_validate(&pairs)?,
        Commands::Export {
            format,
            output,
            cached,
        } => run_export(format, output.as_deref(), cached, &ctx)?,
        Commands::Import { path, format } => run_import(&path, format, &ctx)?,
        Commands::Sync { remote, json } => run_sync(remote.as_deref(), json, &ctx).await?,
        Commands::Conflicts {
            remote,
            resolve,
            json,
        } => run_conflicts(remote.as_deref(), resolve, json, &ctx)?,
        Commands::Cache { command } => run_cache(command, &ctx)?,
        Commands::Whoami => run_whoami(&ctx)?,
        Commands::Completions { shell, output } => run_completions(shell, output.as_deref())?,
    }

    Ok(())
}
