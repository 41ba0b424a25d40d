// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identification history records and aggregate stats.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A saved identification (history entry).
///
/// Immutable after save, except for `notes`. Removed individually or by
/// the free-tier trimming policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentificationRecord {
    /// Record ID
    pub id: String,
    /// Species ID from the identification service
    pub species_id: String,
    /// Common name (e.g. "Red Fox")
    pub common_name: String,
    /// Scientific name (e.g. "Vulpes vulpes")
    pub scientific_name: String,
    /// Species category
    pub category: SpeciesCategory,
    /// Match confidence in [0, 1]
    pub confidence: f32,
    /// Path of the managed media file
    pub image_uri: String,
    /// Capture latitude, if GPS was available
    pub latitude: Option<f64>,
    /// Capture longitude
    pub longitude: Option<f64>,
    /// GPS accuracy in meters
    pub accuracy: Option<f32>,
    /// When the identification was saved
    pub timestamp: DateTime<Utc>,
    /// Whether the user was premium at save time
    pub is_premium: bool,
    /// Free-form user notes (the only mutable field)
    pub notes: Option<String>,
    /// How the capture was made
    pub capture_type: CaptureType,
}

/// Species category of an identification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeciesCategory {
    Plant,
    Wildlife,
    Fungi,
    Insect,
}

/// How a capture was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CaptureType {
    #[default]
    Camera,
    Audio,
}

/// Aggregate stats over a user's identification history.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HistoryStats {
    pub total: u32,
    pub plants: u32,
    pub wildlife: u32,
    pub fungi: u32,
    pub insects: u32,
    /// Oldest entry timestamp
    pub first_identification: Option<DateTime<Utc>>,
    /// Newest entry timestamp
    pub last_identification: Option<DateTime<Utc>>,
    /// Most frequently identified species
    pub top_species: Option<TopSpecies>,
}

/// Most frequently identified species.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopSpecies {
    pub common_name: String,
    pub count: u32,
}

impl HistoryStats {
    /// Compute stats from a newest-first history list.
    pub fn from_records(records: &[IdentificationRecord]) -> HistoryStats {
        let count_category = |category: SpeciesCategory| {
            records.iter().filter(|r| r.category == category).count() as u32
        };

        let mut species_counts: HashMap<&str, u32> = HashMap::new();
        for record in records {
            *species_counts.entry(record.common_name.as_str()).or_insert(0) += 1;
        }
        let top_species = species_counts
            .into_iter()
            .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(name, count)| TopSpecies {
                common_name: name.to_string(),
                count,
            });

        HistoryStats {
            total: records.len() as u32,
            plants: count_category(SpeciesCategory::Plant),
            wildlife: count_category(SpeciesCategory::Wildlife),
            fungi: count_category(SpeciesCategory::Fungi),
            insects: count_category(SpeciesCategory::Insect),
            first_identification: records.last().map(|r| r.timestamp),
            last_identification: records.first().map(|r| r.timestamp),
            top_species,
        }
    }
}
