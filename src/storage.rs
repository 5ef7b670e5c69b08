//! Key/value storage adapters backing the local fallback store.
//!
//! Each key holds one whole collection serialized as a JSON array. Callers
//! read and write collections wholesale.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::error::BackendError;

/// Collection keys
pub mod keys {
    pub const COUPONS: &str = "coupons-data";
    pub const TRANSACTIONS: &str = "transactions-data";
    pub const MERCHANTS: &str = "merchants-data";
    pub const USERS: &str = "users-data";
    pub const MERCHANT_APPLICATIONS: &str = "merchant-applications";
}

/// Storage adapter trait for custom storage implementations
pub trait StorageAdapter: Send + Sync {
    /// Get a value by key
    fn get(&self, key: &str) -> Result<Option<String>, BackendError>;

    /// Set a value by key
    fn set(&self, key: &str, value: &str) -> Result<(), BackendError>;

    /// Remove a value by key
    fn remove(&self, key: &str) -> Result<(), BackendError>;
}

fn poisoned() -> BackendError {
    BackendError::Storage("storage lock poisoned".into())
}

/// In-memory storage adapter
///
/// Used when no store path is configured, and in tests.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    store: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create a new memory storage
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageAdapter for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        Ok(self.store.read().map_err(|_| poisoned())?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), BackendError> {
        self.store
            .write()
            .map_err(|_| poisoned())?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), BackendError> {
        self.store.write().map_err(|_| poisoned())?.remove(key);
        Ok(())
    }
}

/// File-based storage adapter
///
/// Keeps every key in a single JSON object on disk, cached in memory.
/// The whole file is rewritten on each change.
pub struct FileStorage {
    path: PathBuf,
    cache: RwLock<HashMap<String, String>>,
}

impl FileStorage {
    /// Open (or create) the store at `path`, creating parent directories.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, BackendError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }

        let cache = if path.exists() {
            let contents = std::fs::read_to_string(&path).map_err(io_error)?;
            if contents.trim().is_empty() {
                HashMap::new()
            } else {
                serde_json::from_str(&contents)?
            }
        } else {
            HashMap::new()
        };

        Ok(Self {
            path,
            cache: RwLock::new(cache),
        })
    }

    /// Save the cache to disk
    fn save(&self, cache: &HashMap<String, String>) -> Result<(), BackendError> {
        let contents = serde_json::to_string_pretty(cache)?;
        // Write to a sibling then rename so a crash never leaves a torn file.
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, contents).map_err(io_error)?;
        std::fs::rename(&tmp, &self.path).map_err(io_error)?;
        Ok(())
    }

    /// Apply `change` to a copy of the cache. The copy replaces the cache
    /// only once it is on disk.
    fn commit<F>(&self, change: F) -> Result<(), BackendError>
    where
        F: FnOnce(&mut HashMap<String, String>),
    {
        let mut cache = self.cache.write().map_err(|_| poisoned())?;
        let mut next = cache.clone();
        change(&mut next);
        self.save(&next)?;
        *cache = next;
        Ok(())
    }
}

fn io_error(e: std::io::Error) -> BackendError {
    BackendError::Storage(e.to_string())
}

impl StorageAdapter for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        Ok(self.cache.read().map_err(|_| poisoned())?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), BackendError> {
        self.commit(|cache| {
            cache.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), BackendError> {
        self.commit(|cache| {
            cache.remove(key);
        })
    }
}

impl std::fmt::Debug for FileStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileStorage")
            .field("path", &self.path)
            .finish()
    }
}
