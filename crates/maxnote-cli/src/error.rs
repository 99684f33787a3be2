use std::io;

use maxnote_core::models::ParseFieldError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] maxnote_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    UnknownField(#[from] ParseFieldError),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Expected FIELD=VALUE, got '{0}'")]
    MalformedPair(String),
    #[error("{0} value(s) failed validation")]
    InvalidValues(usize),
    #[error("No remote snapshot given and no conflicting snapshot recorded by a previous sync")]
    NoRemoteSnapshot,
    #[error("Sync failed: {0}")]
    SyncFailed(String),
}
