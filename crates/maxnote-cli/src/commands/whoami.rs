use maxnote_core::session::current_user;

use crate::commands::common::AppContext;
use crate::error::CliError;

pub fn run_whoami(ctx: &AppContext) -> Result<(), CliError> {
    let store = ctx.open_store();
    match current_user(&ctx.storage) {
        Some(user) => {
            println!("{} <{}>", user.name, user.email);
            println!("Display name: {}", store.settings().display_name);
        }
        None => println!("Not logged in"),
    }
    Ok(())
}
