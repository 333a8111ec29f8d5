//! Local storage and the single persistence boundary every store writes through.
//!
//! Keys are namespaced per store (`auth-storage`, `role-storage`, ...). Blobs are
//! wrapped in a versioned envelope so a store can migrate or discard state
//! written by an older schema. Writes are last-write-wins with no locking
//! across processes.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::StorageError;

/// Raw key/value storage, the equivalent of the browser's local storage.
pub trait StorageBackend: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
    fn clear(&self) -> Result<(), StorageError>;
}

/// One file per key under a directory.
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl StorageBackend for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)?) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::write(self.path_for(key)?, value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)?) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }

    fn clear(&self) -> Result<(), StorageError> {
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                fs::remove_file(path)?;
            }
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StorageBackend for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries().remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.entries().clear();
        Ok(())
    }
}

/// Schema of a persisted store blob.
pub trait StoreSchema: Serialize + DeserializeOwned + Default + Clone + Send + Sync + 'static {
    /// Storage key, unique per store.
    const NAME: &'static str;
    const VERSION: u32;

    /// State used when nothing usable is persisted.
    fn initial() -> Self {
        Self::default()
    }

    /// Upgrades state written by an older version. `None` discards it.
    fn migrate(_from_version: u32, _state: Value) -> Option<Self> {
        None
    }
}

#[derive(Serialize, Deserialize)]
struct Envelope<T> {
    version: u32,
    state: T,
}

/// The persistence boundary shared by all stores and the session.
#[derive(Clone)]
pub struct Persistence {
    backend: Arc<dyn StorageBackend>,
}

impl Persistence {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::default()))
    }

    /// Loads a store's state. Unreadable or unmigratable blobs yield `None`.
    pub fn load<S: StoreSchema>(&self) -> Option<S> {
        let raw = match self.backend.get(S::NAME) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("Failed to read '{}' from storage: {e}", S::NAME);
                return None;
            }
        };

        let envelope: Envelope<Value> = match serde_json::from_str(&raw) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!("Discarding unreadable '{}' blob: {e}", S::NAME);
                return None;
            }
        };

        if envelope.version == S::VERSION {
            match serde_json::from_value(envelope.state) {
                Ok(state) => Some(state),
                Err(e) => {
                    warn!("Discarding '{}' state that no longer matches its schema: {e}", S::NAME);
                    None
                }
            }
        } else {
            debug!(
                "Migrating '{}' from v{} to v{}",
                S::NAME,
                envelope.version,
                S::VERSION
            );
            S::migrate(envelope.version, envelope.state)
        }
    }

    pub fn save<S: StoreSchema>(&self, state: &S) -> Result<(), StorageError> {
        let raw = serde_json::to_string(&Envelope {
            version: S::VERSION,
            state,
        })?;
        self.backend.set(S::NAME, &raw)
    }

    pub fn get_raw(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.backend.get(key)
    }

    pub fn set_raw(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.backend.set(key, value)
    }

    pub fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.backend.remove(key)
    }

    /// Wipes every key, across all stores.
    pub fn clear_all(&self) -> Result<(), StorageError> {
        self.backend.clear()
    }
}
