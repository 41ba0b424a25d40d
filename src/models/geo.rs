// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Geographic primitives: GPS samples and bounding boxes.

use chrono::{DateTime, Utc};
use geo::{BoundingRect, LineString};
use serde::{Deserialize, Serialize};

/// Earth radius in meters (spherical model used by the distance math).
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// A single GPS sample along a journey route.
///
/// Immutable once created; route ordering is by timestamp ascending.
/// Latitude/longitude ranges are validated at the API boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees, [-90, 90]
    pub latitude: f64,
    /// Longitude in degrees, [-180, 180]
    pub longitude: f64,
    /// Altitude in meters above sea level, if the fix carried one
    pub altitude: Option<f64>,
    /// Horizontal accuracy in meters
    pub accuracy: Option<f32>,
    /// When the fix was taken
    pub timestamp: DateTime<Utc>,
    /// Instantaneous speed in m/s, if reported
    pub speed: Option<f32>,
    /// Bearing in degrees, if reported
    pub bearing: Option<f32>,
}

impl GeoPoint {
    /// Great-circle distance to another point in meters (Haversine).
    ///
    /// Only latitude/longitude are used; altitude is ignored. Symmetric,
    /// and zero for identical points.
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let delta_lat = (other.latitude - self.latitude).to_radians();
        let delta_lon = (other.longitude - self.longitude).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_METERS * c
    }
}

/// Geographic bounds for map display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl GeoBounds {
    /// Compute the bounding box of a route. `None` for an empty route.
    pub fn from_points(points: &[GeoPoint]) -> Option<GeoBounds> {
        let line: LineString<f64> = points
            .iter()
            .map(|p| (p.longitude, p.latitude))
            .collect::<Vec<_>>()
            .into();

        line.bounding_rect().map(|rect| GeoBounds {
            north: rect.max().y,
            south: rect.min().y,
            east: rect.max().x,
            west: rect.min().x,
        })
    }

    /// Expand bounds to include a point.
    pub fn expand(&self, point: &GeoPoint) -> GeoBounds {
        GeoBounds {
            north: self.north.max(point.latitude),
            south: self.south.min(point.latitude),
            east: self.east.max(point.longitude),
            west: self.west.min(point.longitude),
        }
    }

    /// Center of the bounds (latitude, longitude).
    pub fn center(&self) -> (f64, f64) {
        (
            (self.north + self.south) / 2.0,
            (self.east + self.west) / 2.0,
        )
    }
}
