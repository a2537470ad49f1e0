//! Route segment and route shape models

use serde::{Deserialize, Serialize};

use super::Point;

/// Directed leg between two consecutive route points
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Segment {
    /// Index of the start point in the (simplified) point list
    pub id: usize,
    pub start: Point,
    pub end: Point,
    /// Great-circle length in km (3 decimals)
    #[serde(rename = "distance")]
    pub distance_km: f64,
    /// Initial bearing in degrees, 0 = north (1 decimal)
    #[serde(rename = "bearing")]
    pub bearing_deg: f64,
    /// 16-point compass label of the bearing
    #[serde(default)]
    pub bearing_text: String,
}

/// Overall shape of a route, used to explain whether reversing it is meaningful
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RouteInfo {
    /// Start and end are less than 500 m apart
    Loop { description: String, is_loop: bool },
    /// Point-to-point route heading roughly `direction`
    Linear {
        description: String,
        direction: String,
        bearing: f64,
        is_loop: bool,
    },
    /// Not enough points to tell
    Unknown { description: String },
}

impl RouteInfo {
    #[must_use]
    pub fn is_loop(&self) -> bool {
        matches!(self, RouteInfo::Loop { .. })
    }
}
