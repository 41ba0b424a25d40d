// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Journey model and route statistics.
//!
//! `JourneyStats` is derived state: it is recomputed from the full route
//! and discovery list on every accepted mutation, never patched
//! incrementally. Distance is therefore monotonically non-decreasing as
//! points are appended.

use crate::models::discovery::Discovery;
use crate::models::geo::GeoPoint;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A tracked outdoor walk with a GPS route and associated discoveries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Journey {
    /// Journey ID
    pub id: Uuid,
    /// Owning user
    pub user_id: String,
    /// Title, defaults to "Nature Walk"
    pub title: String,
    /// Optional description
    pub description: Option<String>,
    /// When tracking started
    pub start_time: DateTime<Utc>,
    /// When tracking ended (completed or cancelled)
    pub end_time: Option<DateTime<Utc>>,
    /// Lifecycle status
    pub status: JourneyStatus,
    /// Ordered GPS samples; append-only while active, frozen afterwards
    pub route: Vec<GeoPoint>,
    /// Derived statistics for the current route + discoveries
    pub stats: JourneyStats,
    /// Discovery IDs captured during this journey
    #[serde(default)]
    pub discoveries: Vec<Uuid>,
    /// Whether the journey has been shared publicly
    #[serde(default)]
    pub is_public: bool,
    /// Public share URL, once shared
    pub share_url: Option<String>,
    /// User-assigned tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// Free-form notes
    pub notes: Option<String>,
}

impl Journey {
    /// Whether the journey is currently recording points.
    pub fn is_active(&self) -> bool {
        self.status == JourneyStatus::Active
    }

    /// Whether the journey reached a terminal state.
    pub fn is_finished(&self) -> bool {
        matches!(
            self.status,
            JourneyStatus::Completed | JourneyStatus::Cancelled
        )
    }
}

/// Journey lifecycle status.
///
/// `Completed` and `Cancelled` are terminal; no further transitions or
/// route mutations are permitted from them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JourneyStatus {
    /// Currently tracking
    Active,
    /// Temporarily paused
    Paused,
    /// Finished and saved to history
    Completed,
    /// Abandoned; not saved unless configured otherwise
    Cancelled,
}

/// Derived statistics for a journey route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct JourneyStats {
    /// Total route distance in meters
    pub distance_meters: f64,
    /// Wall-clock duration from first to last point, in milliseconds
    pub duration_millis: i64,
    /// Cumulative elevation gain in meters (unset if no altitude data)
    pub elevation_gain_meters: Option<f64>,
    /// Cumulative elevation loss in meters, as a positive magnitude
    pub elevation_loss_meters: Option<f64>,
    /// Highest elevation seen, in meters
    pub max_elevation_meters: Option<f64>,
    /// Lowest elevation seen, in meters
    pub min_elevation_meters: Option<f64>,
    /// Total distance / total duration, in m/s
    pub avg_speed_mps: Option<f64>,
    /// Highest reported instantaneous speed, in m/s
    pub max_speed_mps: Option<f64>,
    /// Number of discoveries captured
    pub discovery_count: u32,
    /// Number of photo discoveries
    pub photo_count: u32,
    /// Number of audio discoveries
    pub audio_count: u32,
    /// Accumulated pause time in milliseconds (set at the journey level)
    pub pause_duration_millis: i64,
}

impl JourneyStats {
    /// Fold an ordered route (plus discoveries) into a stats summary.
    ///
    /// An empty route yields the zero-valued default. Missing altitude or
    /// speed on individual points degrades to unset optional fields; this
    /// never fails. Average speed is total distance over total wall-clock
    /// time, not a mean of segment speeds, so a stationary stretch
    /// depresses it. Pause time is not subtracted here.
    pub fn from_route(route: &[GeoPoint], discoveries: &[Discovery]) -> JourneyStats {
        let (first, last) = match (route.first(), route.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return JourneyStats::default(),
        };

        let mut distance = 0.0_f64;
        let mut elevation_gain = 0.0_f64;
        let mut elevation_loss = 0.0_f64;
        let mut max_elevation = first.altitude.unwrap_or(0.0);
        let mut min_elevation = first.altitude.unwrap_or(0.0);
        let mut max_speed = 0.0_f32;

        for pair in route.windows(2) {
            let (prev, current) = (&pair[0], &pair[1]);

            distance += prev.distance_to(current);

            if let (Some(prev_alt), Some(curr_alt)) = (prev.altitude, current.altitude) {
                let diff = curr_alt - prev_alt;
                if diff > 0.0 {
                    elevation_gain += diff;
                } else {
                    elevation_loss += -diff;
                }
                max_elevation = max_elevation.max(curr_alt);
                min_elevation = min_elevation.min(curr_alt);
            }

            if let Some(speed) = current.speed {
                max_speed = max_speed.max(speed);
            }
        }

        let duration_secs =
            (last.timestamp.timestamp_millis() - first.timestamp.timestamp_millis()) as f64
                / 1000.0;
        let avg_speed = if duration_secs > 0.0 {
            distance / duration_secs
        } else {
            0.0
        };

        // Summary elevation fields are emitted only if at least one point
        // carried altitude data.
        let has_altitude = route.iter().any(|p| p.altitude.is_some());

        JourneyStats {
            distance_meters: distance,
            duration_millis: (duration_secs * 1000.0) as i64,
            elevation_gain_meters: (elevation_gain > 0.0).then_some(elevation_gain),
            elevation_loss_meters: (elevation_loss > 0.0).then_some(elevation_loss),
            max_elevation_meters: has_altitude.then_some(max_elevation),
            min_elevation_meters: has_altitude.then_some(min_elevation),
            avg_speed_mps: Some(avg_speed),
            max_speed_mps: (max_speed > 0.0).then_some(max_speed as f64),
            discovery_count: discoveries.len() as u32,
            photo_count: discoveries
                .iter()
                .filter(|d| d.discovery_type.is_photo())
                .count() as u32,
            audio_count: discoveries
                .iter()
                .filter(|d| d.discovery_type.is_audio())
                .count() as u32,
            pause_duration_millis: 0,
        }
    }
}

/// Totals across a user's completed journeys.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct JourneySummaryStats {
    pub total_journeys: u32,
    pub total_distance_meters: f64,
    pub total_duration_millis: i64,
    pub total_discoveries: u32,
    /// Longest journey by distance
    pub longest_journey_id: Option<Uuid>,
    /// Journey with the most discoveries
    pub most_discoveries_journey_id: Option<Uuid>,
}

impl JourneySummaryStats {
    /// Aggregate totals over completed journeys.
    pub fn from_journeys(journeys: &[Journey]) -> JourneySummaryStats {
        let completed: Vec<&Journey> = journeys
            .iter()
            .filter(|j| j.status == JourneyStatus::Completed)
            .collect();

        let longest = completed
            .iter()
            .max_by(|a, b| {
                a.stats
                    .distance_meters
                    .total_cmp(&b.stats.distance_meters)
            })
            .map(|j| j.id);
        let most_discoveries = completed
            .iter()
            .max_by_key(|j| j.stats.discovery_count)
            .map(|j| j.id);

        JourneySummaryStats {
            total_journeys: completed.len() as u32,
            total_distance_meters: completed.iter().map(|j| j.stats.distance_meters).sum(),
            total_duration_millis: completed.iter().map(|j| j.stats.duration_millis).sum(),
            total_discoveries: completed.iter().map(|j| j.stats.discovery_count).sum(),
            longest_journey_id: longest,
            most_discoveries_journey_id: most_discoveries,
        }
    }
}
