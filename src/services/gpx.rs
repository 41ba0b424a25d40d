// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! GPX 1.1 export for journey routes.

use crate::models::Journey;
use crate::time_utils::format_utc_rfc3339;
use std::fmt::Write as _;

/// Serialize a journey route as a GPX 1.1 document.
pub fn to_gpx(journey: &Journey) -> String {
    let title = escape_xml(&journey.title);

    let mut gpx = String::new();
    gpx.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    gpx.push_str("<gpx version=\"1.1\" creator=\"Wildtrail\">\n");
    gpx.push_str("  <metadata>\n");
    let _ = writeln!(gpx, "    <name>{}</name>", title);
    let _ = writeln!(
        gpx,
        "    <time>{}</time>",
        format_utc_rfc3339(journey.start_time)
    );
    gpx.push_str("  </metadata>\n");
    gpx.push_str("  <trk>\n");
    let _ = writeln!(gpx, "    <name>{}</name>", title);
    gpx.push_str("    <trkseg>\n");

    for point in &journey.route {
        let _ = writeln!(
            gpx,
            "      <trkpt lat=\"{}\" lon=\"{}\">",
            point.latitude, point.longitude
        );
        if let Some(altitude) = point.altitude {
            let _ = writeln!(gpx, "        <ele>{}</ele>", altitude);
        }
        let _ = writeln!(
            gpx,
            "        <time>{}</time>",
            format_utc_rfc3339(point.timestamp)
        );
        gpx.push_str("      </trkpt>\n");
    }

    gpx.push_str("    </trkseg>\n");
    gpx.push_str("  </trk>\n");
    gpx.push_str("</gpx>\n");
    gpx
}

/// Escape text for XML element content.
fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GeoPoint, JourneyStats, JourneyStatus};
    use chrono::TimeZone;
    use chrono::Utc;
    use uuid::Uuid;

    fn test_journey() -> Journey {
        let start = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        Journey {
            id: Uuid::new_v4(),
            user_id: "u1".to_string(),
            title: "Oak & Madrone <Loop>".to_string(),
            description: None,
            start_time: start,
            end_time: None,
            status: JourneyStatus::Completed,
            route: vec![
                GeoPoint {
                    latitude: 37.0,
                    longitude: -122.0,
                    altitude: Some(120.5),
                    accuracy: None,
                    timestamp: start,
                    speed: None,
                    bearing: None,
                },
                GeoPoint {
                    latitude: 37.001,
                    longitude: -122.0,
                    altitude: None,
                    accuracy: None,
                    timestamp: start + chrono::Duration::seconds(60),
                    speed: None,
                    bearing: None,
                },
            ],
            stats: JourneyStats::default(),
            discoveries: vec![],
            is_public: false,
            share_url: None,
            tags: vec![],
            notes: None,
        }
    }

    #[test]
    fn test_gpx_structure() {
        let gpx = to_gpx(&test_journey());

        assert!(gpx.starts_with("<?xml version=\"1.0\""));
        assert!(gpx.contains("<gpx version=\"1.1\""));
        assert_eq!(gpx.matches("<trkpt ").count(), 2);
        assert!(gpx.contains("lat=\"37\" lon=\"-122\""));
        // Altitude emitted only for the point that has one
        assert_eq!(gpx.matches("<ele>").count(), 1);
        assert!(gpx.contains("<ele>120.5</ele>"));
        assert!(gpx.trim_end().ends_with("</gpx>"));
    }

    #[test]
    fn test_gpx_escapes_title() {
        let gpx = to_gpx(&test_journey());
        assert!(gpx.contains("Oak &amp; Madrone &lt;Loop&gt;"));
        assert!(!gpx.contains("<Loop>"));
    }
}
