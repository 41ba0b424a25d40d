// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JSON key-value store with typed operations.
//!
//! The on-disk layout is one JSON file per key under the data directory.
//! Values are whole documents; callers read-modify-write them. An
//! in-memory mode backs unit and API tests.

use crate::error::AppError;
use dashmap::DashMap;
use serde::{de::DeserializeOwned, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// Key-value store for JSON documents.
#[derive(Clone)]
pub struct Store {
    backend: Backend,
}

#[derive(Clone)]
enum Backend {
    Disk { root: PathBuf },
    Memory(Arc<DashMap<String, serde_json::Value>>),
}

impl Store {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, AppError> {
        let root = root.into();
        std::fs::create_dir_all(&root)
            .map_err(|e| AppError::Storage(format!("Failed to create data dir: {}", e)))?;

        tracing::info!(path = %root.display(), "Opened JSON store");
        Ok(Self {
            backend: Backend::Disk { root },
        })
    }

    /// Create an in-memory store for testing.
    pub fn in_memory() -> Self {
        Self {
            backend: Backend::Memory(Arc::new(DashMap::new())),
        }
    }

    /// Read and deserialize the document at `key`, if present.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, AppError> {
        match &self.backend {
            Backend::Disk { root } => {
                let path = root.join(file_name(key));
                match tokio::fs::read(&path).await {
                    Ok(bytes) => {
                        let value = serde_json::from_slice(&bytes).map_err(|e| {
                            AppError::Storage(format!("Corrupt document '{}': {}", key, e))
                        })?;
                        Ok(Some(value))
                    }
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
                    Err(e) => Err(AppError::Storage(format!(
                        "Failed to read '{}': {}",
                        key, e
                    ))),
                }
            }
            Backend::Memory(map) => map
                .get(key)
                .map(|v| {
                    serde_json::from_value(v.clone()).map_err(|e| {
                        AppError::Storage(format!("Corrupt document '{}': {}", key, e))
                    })
                })
                .transpose(),
        }
    }

    /// Serialize and write `value` at `key`, replacing any existing document.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), AppError> {
        match &self.backend {
            Backend::Disk { root } => {
                let bytes = serde_json::to_vec(value)
                    .map_err(|e| AppError::Storage(format!("Failed to serialize '{}': {}", key, e)))?;
                let path = root.join(file_name(key));
                tokio::fs::write(&path, bytes).await.map_err(|e| {
                    AppError::Storage(format!("Failed to write '{}': {}", key, e))
                })
            }
            Backend::Memory(map) => {
                let value = serde_json::to_value(value)
                    .map_err(|e| AppError::Storage(format!("Failed to serialize '{}': {}", key, e)))?;
                map.insert(key.to_string(), value);
                Ok(())
            }
        }
    }

    /// Remove the document at `key`. Removing a missing key is not an error.
    pub async fn remove(&self, key: &str) -> Result<(), AppError> {
        match &self.backend {
            Backend::Disk { root } => {
                let path = root.join(file_name(key));
                match tokio::fs::remove_file(&path).await {
                    Ok(()) => Ok(()),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                    Err(e) => Err(AppError::Storage(format!(
                        "Failed to remove '{}': {}",
                        key, e
                    ))),
                }
            }
            Backend::Memory(map) => {
                map.remove(key);
                Ok(())
            }
        }
    }
}

/// Map a store key to a safe file name.
fn file_name(key: &str) -> String {
    let sanitized: String = key
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{sanitized}.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Doc {
        name: String,
        count: u32,
    }

    #[tokio::test]
    async fn test_memory_round_trip() {
        let store = Store::in_memory();
        let doc = Doc {
            name: "coyote".to_string(),
            count: 2,
        };

        store.set("test:doc", &doc).await.unwrap();
        let loaded: Option<Doc> = store.get("test:doc").await.unwrap();
        assert_eq!(loaded, Some(doc));

        store.remove("test:doc").await.unwrap();
        let gone: Option<Doc> = store.get("test:doc").await.unwrap();
        assert!(gone.is_none());
    }

    #[tokio::test]
    async fn test_disk_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        let doc = Doc {
            name: "oak".to_string(),
            count: 7,
        };

        store.set("history:user/1", &doc).await.unwrap();
        let loaded: Option<Doc> = store.get("history:user/1").await.unwrap();
        assert_eq!(loaded, Some(doc));

        // Removing twice is fine
        store.remove("history:user/1").await.unwrap();
        store.remove("history:user/1").await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_key_is_none() {
        let store = Store::in_memory();
        let loaded: Option<Doc> = store.get("nope").await.unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_file_name_sanitizes_separators() {
        assert_eq!(file_name("history:user/1"), "history:user_1.json");
        assert_eq!(file_name("trial:abc-123"), "trial:abc-123.json");
    }
}
