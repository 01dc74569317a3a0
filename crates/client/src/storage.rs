//! Durable key-value storage port.
//!
//! The session store persists the credential and serialized identity through
//! this interface; the request pipeline reads the credential key on every
//! outgoing call and clears both keys once, on 401. Implementations mirror
//! browser `localStorage` semantics: infallible from the caller's point of
//! view, with write failures logged rather than surfaced.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

/// Fixed keys in the durable store.
pub mod keys {
    /// Raw bearer token string.
    pub const AUTH_TOKEN: &str = "auth_token";
    /// JSON-serialized identity of the authenticated principal.
    pub const AUTH_USER: &str = "auth_user";
}

/// Process-wide key-value store addressed by fixed string keys.
pub trait StoragePort: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;
    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str);
    /// Remove the value stored under `key`, if any.
    fn remove(&self, key: &str);
}

/// In-memory storage for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl StoragePort for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}

/// JSON-file-backed storage, durable across process restarts.
///
/// The whole map is rewritten on every mutation, so the on-disk copy is never
/// partially updated.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: RwLock<HashMap<String, String>>,
}

impl FileStorage {
    /// Open (or create) a file-backed store at `path`.
    ///
    /// An unreadable or corrupt file starts the store empty rather than
    /// failing: a session that cannot be restored is simply not restored.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "discarding corrupt session file");
                HashMap::new()
            }),
            Err(_) => HashMap::new(),
        };

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    fn flush(&self, entries: &HashMap<String, String>) {
        match serde_json::to_string_pretty(entries) {
            Ok(raw) => {
                if let Err(e) = std::fs::write(&self.path, raw) {
                    tracing::warn!(path = %self.path.display(), error = %e, "failed to persist session file");
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize session file");
            }
        }
    }
}

impl StoragePort for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries);
    }

    fn remove(&self, key: &str) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        self.flush(&entries);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_round_trip() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get(keys::AUTH_TOKEN), None);

        storage.set(keys::AUTH_TOKEN, "tok-1");
        assert_eq!(storage.get(keys::AUTH_TOKEN), Some("tok-1".to_string()));

        storage.set(keys::AUTH_TOKEN, "tok-2");
        assert_eq!(storage.get(keys::AUTH_TOKEN), Some("tok-2".to_string()));

        storage.remove(keys::AUTH_TOKEN);
        assert_eq!(storage.get(keys::AUTH_TOKEN), None);
    }

    #[test]
    fn test_file_storage_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let storage = FileStorage::open(&path).unwrap();
        storage.set(keys::AUTH_TOKEN, "tok");
        storage.set(keys::AUTH_USER, "{}");
        drop(storage);

        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(reopened.get(keys::AUTH_TOKEN), Some("tok".to_string()));
        assert_eq!(reopened.get(keys::AUTH_USER), Some("{}".to_string()));
    }

    #[test]
    fn test_file_storage_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();

        let storage = FileStorage::open(&path).unwrap();
        assert_eq!(storage.get(keys::AUTH_TOKEN), None);
    }
}
