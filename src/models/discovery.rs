// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Species discoveries captured during a journey.

use crate::models::geo::GeoPoint;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A species observation (photo or audio) captured during a journey.
///
/// Immutable once created, except for favorite/notes/tags edits. Journeys
/// reference discoveries by id; a discovery does not own its journey.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Discovery {
    /// Discovery ID
    pub id: Uuid,
    /// Owning journey, if captured during one
    pub journey_id: Option<Uuid>,
    /// What kind of capture this is
    #[serde(rename = "type")]
    pub discovery_type: DiscoveryType,
    /// When the capture was taken
    pub timestamp: DateTime<Utc>,
    /// Where the capture was taken
    pub location: GeoPoint,
    /// Path/URL of the photo or audio file
    pub media_url: String,
    /// AI identification outcome, if one was produced
    pub identification: Option<DiscoveryIdentification>,
    /// Free-form user notes
    pub user_notes: Option<String>,
    /// Marked as favorite by the user
    #[serde(default)]
    pub is_favorite: bool,
    /// User-assigned tags
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Identification summary attached to a discovery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryIdentification {
    /// Species ID from the identification service
    pub species_id: String,
    /// Common name
    pub common_name: String,
    /// Scientific name
    pub scientific_name: String,
    /// Match confidence in [0, 1]
    pub confidence: f32,
}

/// Types of discoveries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryType {
    PhotoPlant,
    PhotoWildlife,
    PhotoFungi,
    AudioBird,
    AudioMammal,
    AudioInsect,
    ManualObservation,
}

impl DiscoveryType {
    /// Whether this is a photo capture.
    pub fn is_photo(self) -> bool {
        matches!(
            self,
            DiscoveryType::PhotoPlant | DiscoveryType::PhotoWildlife | DiscoveryType::PhotoFungi
        )
    }

    /// Whether this is an audio capture.
    pub fn is_audio(self) -> bool {
        matches!(
            self,
            DiscoveryType::AudioBird | DiscoveryType::AudioMammal | DiscoveryType::AudioInsect
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_categories() {
        assert!(DiscoveryType::PhotoFungi.is_photo());
        assert!(!DiscoveryType::PhotoFungi.is_audio());
        assert!(DiscoveryType::AudioBird.is_audio());
        assert!(!DiscoveryType::AudioBird.is_photo());
        // Manual observations are neither photo nor audio
        assert!(!DiscoveryType::ManualObservation.is_photo());
        assert!(!DiscoveryType::ManualObservation.is_audio());
    }
}
