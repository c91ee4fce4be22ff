//! Typed async key-value interface over persistent local storage.
//!
//! The storage model mirrors a flat key-value scope: one JSON object
//! document, each top-level key an independent value. Absence is explicit
//! (`Ok(None)`), and I/O failure is a first-class [`KvError`] rather than an
//! implicit empty read.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::persist;

#[derive(Debug, thiserror::Error)]
pub enum KvError {
    #[error("failed to read store at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write store at {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to serialize value for key {key:?}: {source}")]
    Serialize {
        key: String,
        source: serde_json::Error,
    },
    #[error("failed to deserialize value for key {key:?}: {source}")]
    Deserialize {
        key: String,
        source: serde_json::Error,
    },
}

/// Asynchronous typed key-value store.
///
/// Implementations serialize values as JSON. `get` distinguishes "never set"
/// (`Ok(None)`) from a failed read (`Err`), so callers choose their own
/// degradation policy.
#[allow(async_fn_in_trait)]
pub trait KvStore: Clone + Send + Sync {
    async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, KvError>;

    async fn set<T: Serialize + Sync>(&self, key: &str, value: &T) -> Result<(), KvError>;
}

/// Store backed by a single JSON document on disk.
///
/// Every `set` is a read-modify-write of the whole document followed by an
/// atomic rename; the document is written owner-only since it carries the
/// API key. An async mutex serializes read-modify-write sequences within
/// this process, so two near-simultaneous writers cannot lose updates.
/// Cross-process writers remain last-write-wins.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: Arc<PathBuf>,
    lock: Arc<tokio::sync::Mutex<()>>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        persist::recover_bak_file(&path);
        Self {
            path: Arc::new(path),
            lock: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<Option<Map<String, Value>>, KvError> {
        let content = match std::fs::read_to_string(self.path.as_ref()) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(KvError::Read {
                    path: self.path.as_ref().clone(),
                    source: e,
                });
            }
        };

        match serde_json::from_str::<Map<String, Value>>(&content) {
            Ok(map) => Ok(Some(map)),
            Err(e) => Err(KvError::Deserialize {
                key: String::new(),
                source: e,
            }),
        }
    }

    fn write_document(&self, document: &Map<String, Value>) -> Result<(), KvError> {
        let bytes = serde_json::to_vec_pretty(document).map_err(|e| KvError::Serialize {
            key: String::new(),
            source: e,
        })?;
        persist::atomic_write(&self.path, &bytes, true).map_err(|e| KvError::Write {
            path: self.path.as_ref().clone(),
            source: e,
        })
    }
}

impl KvStore for JsonFileStore {
    async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, KvError> {
        let _guard = self.lock.lock().await;
        let Some(mut document) = self.read_document()? else {
            return Ok(None);
        };
        match document.remove(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| KvError::Deserialize {
                    key: key.to_string(),
                    source: e,
                }),
        }
    }

    async fn set<T: Serialize + Sync>(&self, key: &str, value: &T) -> Result<(), KvError> {
        let _guard = self.lock.lock().await;
        // An unreadable document is already lost data; rebuilding around the
        // new key is the recovery path, not a silent success.
        let mut document = match self.read_document() {
            Ok(Some(document)) => document,
            Ok(None) => Map::new(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "Rebuilding unreadable store document: {e}");
                Map::new()
            }
        };
        let value = serde_json::to_value(value).map_err(|e| KvError::Serialize {
            key: key.to_string(),
            source: e,
        })?;
        document.insert(key.to_string(), value);
        self.write_document(&document)
    }
}

/// In-memory store for tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    map: Arc<std::sync::Mutex<Map<String, Value>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, KvError> {
        let value = {
            let map = self.map.lock().expect("memory store lock");
            map.get(key).cloned()
        };
        match value {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| KvError::Deserialize {
                    key: key.to_string(),
                    source: e,
                }),
        }
    }

    async fn set<T: Serialize + Sync>(&self, key: &str, value: &T) -> Result<(), KvError> {
        let value = serde_json::to_value(value).map_err(|e| KvError::Serialize {
            key: key.to_string(),
            source: e,
        })?;
        let mut map = self.map.lock().expect("memory store lock");
        map.insert(key.to_string(), value);
        Ok(())
    }
}
