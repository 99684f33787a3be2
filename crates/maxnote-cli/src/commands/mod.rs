pub mod cache;
pub mod common;
pub mod completions;
pub mod export;
pub mod settings;
pub mod sync;
pub mod whoami;
