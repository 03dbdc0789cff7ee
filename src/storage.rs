//! Per-device persistent key/value storage.
//!
//! Each virtual switch owns a [`DeviceStorage`] handle scoped to its native id.
//! Handles are backed by a [`StoreBackend`], either in memory or a JSON file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage I/O failed for {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Storage file {path} is not valid JSON: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
}

pub trait StoreBackend: Send + Sync {
    fn get(&self, device_id: &str, key: &str) -> Option<String>;
    fn set(&self, device_id: &str, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Key/value view of a backend restricted to one device.
#[derive(Clone)]
pub struct DeviceStorage {
    device_id: String,
    backend: Arc<dyn StoreBackend>,
}

impl DeviceStorage {
    pub fn new(device_id: impl Into<String>, backend: Arc<dyn StoreBackend>) -> Self {
        Self {
            device_id: device_id.into(),
            backend,
        }
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn get_item(&self, key: &str) -> Option<String> {
        self.backend.get(&self.device_id, key)
    }

    pub fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        debug!("Storing {key} for device {}", self.device_id);
        self.backend.set(&self.device_id, key, value)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    items: DashMap<String, BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StoreBackend for MemoryStore {
    fn get(&self, device_id: &str, key: &str) -> Option<String> {
        self.items
            .get(device_id)
            .and_then(|items| items.get(key).cloned())
    }

    fn set(&self, device_id: &str, key: &str, value: &str) -> Result<(), StorageError> {
        self.items
            .entry(device_id.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

type Devices = BTreeMap<String, BTreeMap<String, String>>;

/// Store persisted as a single JSON document, rewritten on every change.
pub struct JsonFileStore {
    path: PathBuf,
    items: Mutex<Devices>,
}

impl JsonFileStore {
    /// Opens the store, starting empty when the file does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let items = match std::fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => Devices::new(),
            Ok(content) => serde_json::from_str(&content).map_err(|source| StorageError::Json {
                path: path.display().to_string(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Store {} not found, starting empty", path.display());
                Devices::new()
            }
            Err(source) => {
                return Err(StorageError::Io {
                    path: path.display().to_string(),
                    source,
                });
            }
        };
        Ok(Self {
            path,
            items: Mutex::new(items),
        })
    }

    /// Writes `items` next to the store and renames it over the old file.
    fn flush(&self, items: &Devices) -> Result<(), StorageError> {
        let content = serde_json::to_string_pretty(items).map_err(|source| StorageError::Json {
            path: self.path.display().to_string(),
            source,
        })?;
        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        let staging = PathBuf::from(staging);
        std::fs::write(&staging, content)
            .and_then(|_| std::fs::rename(&staging, &self.path))
            .map_err(|source| StorageError::Io {
                path: self.path.display().to_string(),
                source,
            })
    }
}

impl StoreBackend for JsonFileStore {
    fn get(&self, device_id: &str, key: &str) -> Option<String> {
        self.items
            .lock()
            .get(device_id)
            .and_then(|items| items.get(key).cloned())
    }

    fn set(&self, device_id: &str, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self.items.lock();
        let mut updated = items.clone();
        updated
            .entry(device_id.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
        self.flush(&updated)?;
        *items = updated;
        Ok(())
    }
}
