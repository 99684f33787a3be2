use crate::cli::CacheCommands;
use crate::commands::common::{format_sync_timestamp, AppContext};
use crate::error::CliError;

pub fn run_cache(command: CacheCommands, ctx: &AppContext) -> Result<(), CliError> {
    let sync = ctx.open_sync(None);
    match command {
        CacheCommands::Clear { key } => {
            let key = maxnote_core::util::normalize_text_option(key);
            sync.cache().clear(key.as_deref());
            match key {
                Some(key) => println!("Cleared cache entry {key}"),
                None => println!("Cleared settings cache"),
            }
        }
        CacheCommands::Status => {
            match sync.last_sync() {
                Some(timestamp) => println!("Last sync: {}", format_sync_timestamp(timestamp)),
                None => println!("Last sync: never"),
            }
            println!(
                "Pre-sync backup: {}",
                if sync.restore_backup().is_some() {
                    "available"
                } else {
                    "none"
                }
            );
            println!(
                "Pending remote snapshot: {}",
                if sync.pending_remote().is_some() {
                    "yes"
                } else {
                    "no"
                }
            );
            println!("Cache version: {}", sync.cache().version());
        }
    }
    Ok(())
}
