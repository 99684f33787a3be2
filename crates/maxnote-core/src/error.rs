//! Error types for maxnote-core

use thiserror::Error;

use crate::storage::StorageError;
use crate::validation::ValidationErrors;

/// Result type alias using maxnote-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in maxnote-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// One or more fields failed their validation rule
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// Key-value storage error
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// CSV encoding/decoding error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<ValidationErrors> for Error {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}
