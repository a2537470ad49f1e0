//! Wind analysis results: per-segment scoring, route summary and API payloads

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Point, RouteInfo, Segment};

/// How the wind affects travel along a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindImpact {
    /// Tailwind-dominated, shortens travel time
    Favorable,
    /// Headwind-dominated, lengthens travel time
    Unfavorable,
    /// Roughly perpendicular wind
    Crosswind,
}

/// Traversal direction of the route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// As recorded in the track
    Normal,
    /// From the last point back to the first
    Reverse,
}

/// Wind effect for one traversal direction of a segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirectionalImpact {
    pub impact: WindImpact,
    /// Signed time factor (positive = slower), 3 decimals
    pub factor: f64,
    /// `base_time * (1 + factor)`, 2 decimals
    pub estimated_time_minutes: f64,
}

/// A segment scored against the wind forecast for its arrival time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentAnalysis {
    #[serde(flatten)]
    pub segment: Segment,
    /// Projected arrival at the segment start
    #[serde(with = "minute_format")]
    pub segment_datetime: NaiveDateTime,
    /// Minutes since ride start when reaching this segment
    pub cumulative_time: f64,
    /// Travel time without wind
    pub base_time_minutes: f64,
    /// Wind speed used, km/h
    pub wind_speed: f64,
    /// Direction the wind blows from, whole degrees
    pub wind_direction: f64,
    pub wind_direction_text: String,
    pub normal: DirectionalImpact,
    pub reverse: DirectionalImpact,
}

/// Round-trip totals and the recommended direction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSummary {
    pub total_time_normal: f64,
    pub total_time_reverse: f64,
    pub headwind_distance_normal: f64,
    pub headwind_distance_reverse: f64,
    pub favorable_segments_normal: usize,
    pub favorable_segments_reverse: usize,
    pub total_distance: f64,
    pub best_direction: Direction,
    pub time_saved_minutes: f64,
}

/// Window of the forecast that the dominant wind summarizes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSpan {
    #[serde(with = "minute_format")]
    pub start: NaiveDateTime,
    #[serde(with = "minute_format")]
    pub end: NaiveDateTime,
    pub duration_minutes: f64,
}

/// Representative wind vector for the whole ride
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DominantWind {
    /// km/h, 1 decimal
    pub speed: f64,
    /// Whole degrees in `[0, 360)`
    pub direction: f64,
    pub direction_text: String,
    pub time_span: TimeSpan,
}

/// Result of parsing an uploaded track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseResponse {
    pub name: String,
    pub points: Vec<Point>,
    pub segments: Vec<Segment>,
    pub total_distance: f64,
    pub total_points: usize,
    pub route_info: RouteInfo,
}

/// Wind analysis request as sent by the UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub segments: Vec<Segment>,
    /// Local ride start, `YYYY-MM-DDTHH:MM`
    pub datetime: String,
    /// Average rider speed in km/h
    pub rider_speed: f64,
}

/// Full wind analysis of a route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub segments: Vec<SegmentAnalysis>,
    pub center_point: Point,
    pub dominant_wind: DominantWind,
    pub summary: RouteSummary,
}

impl fmt::Display for WindImpact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindImpact::Favorable => write!(f, "favorable"),
            WindImpact::Unfavorable => write!(f, "unfavorable"),
            WindImpact::Crosswind => write!(f, "crosswind"),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Normal => write!(f, "normal"),
            Direction::Reverse => write!(f, "reverse"),
        }
    }
}

/// `YYYY-MM-DDTHH:MM` (de)serialization for local timestamps
pub mod minute_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::models::weather::TIME_FORMAT;

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.format(TIME_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, TIME_FORMAT).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(
            serde_json::to_string(&WindImpact::Unfavorable).unwrap(),
            "\"unfavorable\""
        );
        assert_eq!(serde_json::to_string(&Direction::Reverse).unwrap(), "\"reverse\"");
        assert_eq!(WindImpact::Crosswind.to_string(), "crosswind");
    }

    #[test]
    fn test_time_span_format() {
        let start = NaiveDateTime::parse_from_str("2024-06-01T09:30", "%Y-%m-%dT%H:%M").unwrap();
        let span = TimeSpan {
            start,
            end: start + chrono::Duration::minutes(95),
            duration_minutes: 95.0,
        };
        let json = serde_json::to_value(&span).unwrap();
        assert_eq!(json["start"], "2024-06-01T09:30");
        assert_eq!(json["end"], "2024-06-01T11:05");
    }

    #[test]
    fn test_analysis_request_from_ui_payload() {
        let payload = r#"{
            "segments": [{
                "id": 0,
                "start": {"lat": 45.0, "lon": 5.0},
                "end": {"lat": 45.01, "lon": 5.0},
                "distance": 1.112,
                "bearing": 0.0,
                "bearing_text": "N"
            }],
            "datetime": "2024-06-01T09:00",
            "rider_speed": 25
        }"#;
        let request: AnalysisRequest = serde_json::from_str(payload).unwrap();
        assert_eq!(request.segments.len(), 1);
        assert_eq!(request.segments[0].distance_km, 1.112);
        assert_eq!(request.rider_speed, 25.0);
    }
}
