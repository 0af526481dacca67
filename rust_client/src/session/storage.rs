//! Key/value persistence behind the session provider.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::backend::{ApiError, ApiResult, ErrorContext};

/// String key/value store.
///
/// Two handles over the same underlying store observe each other's writes;
/// that is how a second process sharing the storage directory shows up.
pub trait SessionStorage: Send + Sync {
    fn get(&self, key: &str) -> ApiResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> ApiResult<()>;

    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> ApiResult<()>;
}

/// One file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> ApiResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(ApiError::storage(format!("Invalid storage key: {:?}", key)));
        }
        Ok(self.dir.join(key))
    }
}

fn io_error(operation: &str, key: &str, err: std::io::Error) -> ApiError {
    ApiError::storage(err.to_string()).with_context(
        ErrorContext::new(operation)
            .with_resource("storage_key")
            .with_resource_id(key),
    )
}

impl SessionStorage for FileStorage {
    fn get(&self, key: &str) -> ApiResult<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error("storage_get", key, e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> ApiResult<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir).map_err(|e| io_error("storage_set", key, e))?;

        // Write then rename so a concurrent reader never sees half a record.
        let tmp = self.dir.join(format!(".{}.tmp", key));
        fs::write(&tmp, value).map_err(|e| io_error("storage_set", key, e))?;
        fs::rename(&tmp, &path).map_err(|e| io_error("storage_set", key, e))
    }

    fn remove(&self, key: &str) -> ApiResult<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error("storage_remove", key, e)),
        }
    }
}

/// In-memory store; clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> ApiError {
    ApiError::storage("In-memory storage lock is poisoned")
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> ApiResult<Option<String>> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> ApiResult<()> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> ApiResult<()> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_clones_share_entries() {
        let a = MemoryStorage::new();
        let b = a.clone();
        a.set("language", "en").unwrap();
        assert_eq!(b.get("language").unwrap(), Some("en".to_string()));
        b.remove("language").unwrap();
        assert_eq!(a.get("language").unwrap(), None);
    }

    #[test]
    fn test_file_storage_rejects_path_keys() {
        let storage = FileStorage::new("unused");
        assert!(matches!(
            storage.get("../etc/passwd"),
            Err(ApiError::Storage { .. })
        ));
        assert!(storage.set("", "x").is_err());
    }
}
