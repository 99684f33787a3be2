//! Key-value storage seam.
//!
//! The settings store and the cache address a flat, string-keyed text store
//! shaped like browser local storage. Implementations are cheap to clone and
//! clones share the same underlying data.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use thiserror::Error;

/// Errors raised by a `KeyValueStore` backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage quota exceeded: writing {requested} bytes would exceed the {limit} byte limit")]
    QuotaExceeded { requested: usize, limit: usize },
    #[error("Storage IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Storage file is corrupted: {0}")]
    Corrupted(String),
    #[error("Storage is unavailable: {0}")]
    Unavailable(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

pub trait KeyValueStore: Clone + Send + Sync + 'static {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;
    fn remove(&self, key: &str) -> StorageResult<()>;
    fn keys(&self) -> StorageResult<Vec<String>>;
}
