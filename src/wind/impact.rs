//! Wind Impact Model for route segments
//!
//! Scores how a wind observation affects a rider travelling along a segment
//! bearing, as a signed time factor plus a qualitative classification.

use serde::{Deserialize, Serialize};

use crate::geometry::normalize_degrees;
use crate::models::WindImpact;

/// Upper bound of the wind-driven time factor
const MAX_IMPACT: f64 = 0.40;
/// Lower bound of the wind-driven time factor
const MIN_IMPACT: f64 = 0.05;
/// km/h per unit of impact; anything above 8 km/h hits [`MAX_IMPACT`]
const SPEED_DIVISOR: f64 = 20.0;

/// Classification and signed time factor for one direction of travel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindEffect {
    pub impact: WindImpact,
    /// Positive lengthens travel time, negative shortens it
    pub factor: f64,
}

impl WindEffect {
    /// Evaluate the model for a segment bearing against a wind observation.
    ///
    /// `wind_direction` is where the wind blows *from*, so a rider heading
    /// into it (relative angle near 0°) faces a headwind.
    #[must_use]
    pub fn evaluate(segment_bearing: f64, wind_direction: f64, wind_speed: f64) -> Self {
        let relative = relative_angle(segment_bearing, wind_direction);
        let base_impact = (wind_speed / SPEED_DIVISOR).min(MAX_IMPACT);

        let (impact, factor) = match relative {
            r if r <= 30.0 => (WindImpact::Unfavorable, base_impact.max(MIN_IMPACT)),
            r if r <= 60.0 => (WindImpact::Unfavorable, (base_impact * 0.7).max(MIN_IMPACT)),
            r if r <= 120.0 => (
                WindImpact::Crosswind,
                (base_impact * 0.3).max(MIN_IMPACT * 0.5),
            ),
            r if r <= 150.0 => (WindImpact::Favorable, -(base_impact * 0.5).max(MIN_IMPACT)),
            _ => (
                WindImpact::Favorable,
                -(base_impact * 0.8).max(MIN_IMPACT * 1.5),
            ),
        };

        Self { impact, factor }
    }

    /// Travel time once the wind is accounted for
    #[must_use]
    pub fn estimated_time(&self, base_time_minutes: f64) -> f64 {
        base_time_minutes * (1.0 + self.factor)
    }
}

/// Angular difference between two directions, in `[0, 180]`
#[must_use]
pub fn relative_angle(segment_bearing: f64, wind_direction: f64) -> f64 {
    let diff = (normalize_degrees(segment_bearing) - normalize_degrees(wind_direction)).abs();
    if diff > 180.0 { 360.0 - diff } else { diff }
}

/// Bearing of the same segment ridden the other way
#[must_use]
pub fn reverse_bearing(bearing: f64) -> f64 {
    normalize_degrees(bearing + 180.0)
}

/// Windless travel time in minutes
#[must_use]
pub fn base_time_minutes(distance_km: f64, rider_speed_kmh: f64) -> f64 {
    distance_km / rider_speed_kmh * 60.0
}
