// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identification history: saving, searching, and free-tier trimming.
//!
//! Write ordering on save: the media file lands in managed storage first,
//! then the index entry is written. A crash in between leaves only an
//! orphaned file; the index is the source of truth.
//!
//! Free-tier users keep at most `free_history_limit` entries. The cap is
//! a pure insertion-order policy (newest-first list, overflow tail
//! evicted); reading an entry never refreshes its position.

use crate::error::AppError;
use crate::models::{CaptureType, HistoryStats, IdentificationRecord, SpeciesCategory};
use crate::storage::{keys, MediaStore, Store};
use chrono::Utc;
use futures_util::{stream, StreamExt};
use std::path::Path;
use uuid::Uuid;

/// Bounded concurrency for bulk media deletions.
const MAX_CONCURRENT_MEDIA_DELETES: usize = 8;

/// Request to save an identification to history.
#[derive(Debug, Clone)]
pub struct SaveIdentificationRequest {
    pub species_id: String,
    pub common_name: String,
    pub scientific_name: String,
    pub category: SpeciesCategory,
    pub confidence: f32,
    /// Source path of the capture (copied into managed storage)
    pub image_uri: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub accuracy: Option<f32>,
    pub notes: Option<String>,
    pub capture_type: CaptureType,
}

/// Service managing identification history.
#[derive(Clone)]
pub struct HistoryService {
    store: Store,
    media: MediaStore,
    free_history_limit: usize,
}

impl HistoryService {
    pub fn new(store: Store, media: MediaStore, free_history_limit: usize) -> Self {
        Self {
            store,
            media,
            free_history_limit,
        }
    }

    /// Save an identification, trimming the free-tier overflow tail.
    pub async fn save(
        &self,
        user_id: &str,
        request: SaveIdentificationRequest,
        is_premium: bool,
    ) -> Result<IdentificationRecord, AppError> {
        let timestamp = Utc::now();
        let id = format!("id_{}_{}", timestamp.timestamp_millis(), short_suffix());

        // Media first, index second.
        let managed = self
            .media
            .ingest(Path::new(&request.image_uri), &id)
            .await?;

        let record = IdentificationRecord {
            id,
            species_id: request.species_id,
            common_name: request.common_name,
            scientific_name: request.scientific_name,
            category: request.category,
            confidence: request.confidence,
            image_uri: managed.to_string_lossy().into_owned(),
            latitude: request.latitude,
            longitude: request.longitude,
            accuracy: request.accuracy,
            timestamp,
            is_premium,
            notes: request.notes,
            capture_type: request.capture_type,
        };

        let mut history = self.list(user_id).await?;
        history.insert(0, record.clone());

        if !is_premium && history.len() > self.free_history_limit {
            let evicted = history.split_off(self.free_history_limit);
            tracing::info!(
                user_id,
                evicted = evicted.len(),
                limit = self.free_history_limit,
                "Trimming history for free user"
            );
            self.delete_media_bulk(evicted).await;
        }

        self.store.set(&keys::history(user_id), &history).await?;
        tracing::info!(user_id, species = %record.common_name, "Identification saved");
        Ok(record)
    }

    /// All history entries, newest first.
    pub async fn list(&self, user_id: &str) -> Result<Vec<IdentificationRecord>, AppError> {
        let mut history: Vec<IdentificationRecord> = self
            .store
            .get(&keys::history(user_id))
            .await?
            .unwrap_or_default();

        history.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(history)
    }

    /// Fetch one entry by id.
    pub async fn get(
        &self,
        user_id: &str,
        id: &str,
    ) -> Result<IdentificationRecord, AppError> {
        self.list(user_id)
            .await?
            .into_iter()
            .find(|r| r.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Identification {} not found", id)))
    }

    /// Delete one entry and its media file.
    pub async fn delete(&self, user_id: &str, id: &str) -> Result<(), AppError> {
        let mut history = self.list(user_id).await?;
        let index = history
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Identification {} not found", id)))?;

        let removed = history.remove(index);
        self.media.delete(&removed.image_uri).await?;
        self.store.set(&keys::history(user_id), &history).await?;

        tracing::info!(user_id, species = %removed.common_name, "Identification deleted");
        Ok(())
    }

    /// Update the notes on an entry (the only mutable field).
    pub async fn update_notes(
        &self,
        user_id: &str,
        id: &str,
        notes: String,
    ) -> Result<IdentificationRecord, AppError> {
        let mut history = self.list(user_id).await?;
        let record = history
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Identification {} not found", id)))?;

        record.notes = Some(notes);
        let updated = record.clone();
        self.store.set(&keys::history(user_id), &history).await?;
        Ok(updated)
    }

    /// Case-insensitive substring search over names and category.
    pub async fn search(
        &self,
        user_id: &str,
        query: &str,
    ) -> Result<Vec<IdentificationRecord>, AppError> {
        let query = query.to_lowercase();
        let mut history = self.list(user_id).await?;
        history.retain(|r| {
            r.common_name.to_lowercase().contains(&query)
                || r.scientific_name.to_lowercase().contains(&query)
                || category_name(r.category).contains(&query)
        });
        Ok(history)
    }

    /// History entries of one category, newest first.
    pub async fn by_category(
        &self,
        user_id: &str,
        category: SpeciesCategory,
    ) -> Result<Vec<IdentificationRecord>, AppError> {
        let mut history = self.list(user_id).await?;
        history.retain(|r| r.category == category);
        Ok(history)
    }

    /// Aggregate stats over the user's history.
    pub async fn stats(&self, user_id: &str) -> Result<HistoryStats, AppError> {
        let history = self.list(user_id).await?;
        Ok(HistoryStats::from_records(&history))
    }

    /// Delete all entries and their media files.
    pub async fn clear(&self, user_id: &str) -> Result<(), AppError> {
        let history = self.list(user_id).await?;
        let count = history.len();
        self.delete_media_bulk(history).await;
        self.store.remove(&keys::history(user_id)).await?;

        tracing::info!(user_id, count, "Identification history cleared");
        Ok(())
    }

    /// Best-effort bulk media deletion with bounded concurrency.
    async fn delete_media_bulk(&self, records: Vec<IdentificationRecord>) {
        stream::iter(records)
            .for_each_concurrent(MAX_CONCURRENT_MEDIA_DELETES, |record| {
                let media = self.media.clone();
                async move {
                    if let Err(e) = media.delete(&record.image_uri).await {
                        tracing::warn!(error = %e, "Failed to delete evicted media");
                    }
                }
            })
            .await;
    }
}

fn category_name(category: SpeciesCategory) -> &'static str {
    match category {
        SpeciesCategory::Plant => "plant",
        SpeciesCategory::Wildlife => "wildlife",
        SpeciesCategory::Fungi => "fungi",
        SpeciesCategory::Insect => "insect",
    }
}

fn short_suffix() -> String {
    let id = Uuid::new_v4().simple().to_string();
    id[..9].to_string()
}
