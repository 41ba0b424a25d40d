// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Managed media file storage (photos and audio captures).
//!
//! Captures are copied into the media directory under a record-derived
//! name; the history index refers to them by path. Deletion is idempotent
//! so trimming can retry without special cases.

use crate::error::AppError;
use std::path::{Path, PathBuf};

/// File store for capture media.
#[derive(Clone)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    /// Open a media store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, AppError> {
        let root = root.into();
        std::fs::create_dir_all(&root)
            .map_err(|e| AppError::Storage(format!("Failed to create media dir: {}", e)))?;
        Ok(Self { root })
    }

    /// Copy a capture into managed storage, named after `file_stem`.
    ///
    /// The source extension is preserved ("jpg" when there is none).
    /// Returns the managed path.
    pub async fn ingest(&self, source: &Path, file_stem: &str) -> Result<PathBuf, AppError> {
        let extension = source
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("jpg");
        let target = self.root.join(format!("{file_stem}.{extension}"));

        tokio::fs::copy(source, &target).await.map_err(|e| {
            AppError::Storage(format!(
                "Failed to copy media '{}': {}",
                source.display(),
                e
            ))
        })?;

        tracing::debug!(path = %target.display(), "Media saved");
        Ok(target)
    }

    /// Delete a managed media file. A missing file is not an error.
    pub async fn delete(&self, path: &str) -> Result<(), AppError> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => {
                tracing::debug!(path, "Media deleted");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Storage(format!(
                "Failed to delete media '{}': {}",
                path, e
            ))),
        }
    }

    /// Whether a managed media file exists.
    pub async fn exists(&self, path: &str) -> bool {
        tokio::fs::try_exists(path).await.unwrap_or(false)
    }
}
