//! JSON-file backed key-value store.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::{KeyValueStore, StorageError, StorageResult};
use crate::util::compact_text;

/// Key-value store persisted as a single pretty-printed JSON object.
///
/// Every operation re-reads the file so several processes see each other's
/// writes; the mutex only serializes writers inside this process.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Arc::default(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> StorageResult<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let raw = std::fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw).map_err(|error| {
            StorageError::Corrupted(compact_text(&format!(
                "{}: {}",
                self.path.display(),
                error
            )))
        })
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let serialized = serde_json::to_string_pretty(entries)
            .map_err(|error| StorageError::Corrupted(error.to_string()))?;
        std::fs::write(&self.path, serialized)?;
        Ok(())
    }

    /// Move an unreadable file to `<name>.bak` so writes can start over.
    fn set_aside_corrupted(&self, reason: &str) -> StorageResult<BTreeMap<String, String>> {
        let mut backup = self.path.clone().into_os_string();
        backup.push(".bak");
        tracing::warn!(
            "Replacing corrupted storage file ({}); previous contents kept at {}",
            reason,
            PathBuf::from(&backup).display()
        );
        std::fs::rename(&self.path, &backup)?;
        Ok(BTreeMap::new())
    }

    fn modify(&self, edit: impl FnOnce(&mut BTreeMap<String, String>)) -> StorageResult<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StorageError::Unavailable("file store lock poisoned".to_string()))?;
        let mut entries = match self.read_all() {
            Ok(entries) => entries,
            Err(StorageError::Corrupted(reason)) => self.set_aside_corrupted(&reason)?,
            Err(error) => return Err(error),
        };
        edit(&mut entries);
        self.write_all(&entries)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.modify(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.modify(|entries| {
            entries.remove(key);
        })
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        Ok(self.read_all()?.into_keys().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("storage.json"));

        assert_eq!(store.get("anything").unwrap(), None);
        assert!(store.keys().unwrap().is_empty());
    }

    #[test]
    fn writes_persist_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        FileStore::new(&path).set("maxnote-settings", "{}").unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(
            reopened.get("maxnote-settings").unwrap().as_deref(),
            Some("{}")
        );

        reopened.remove("maxnote-settings").unwrap();
        assert_eq!(FileStore::new(&path).get("maxnote-settings").unwrap(), None);
    }

    #[test]
    fn corrupted_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "not json").unwrap();

        let error = FileStore::new(&path).get("key").unwrap_err();
        assert!(matches!(error, StorageError::Corrupted(_)));
    }

    #[test]
    fn write_over_corrupted_file_starts_fresh_and_keeps_backup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "not json").unwrap();
        let store = FileStore::new(&path);

        store.set("maxnote-settings", "{}").unwrap();

        assert_eq!(store.keys().unwrap(), vec!["maxnote-settings".to_string()]);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("storage.json.bak")).unwrap(),
            "not json"
        );
    }

    #[test]
    fn remove_over_corrupted_file_repairs_it() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "not json").unwrap();
        let store = FileStore::new(&path);

        store.remove("maxnote-settings").unwrap();

        assert!(store.keys().unwrap().is_empty());
    }
}
