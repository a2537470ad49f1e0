//! Geographic point model

use serde::{Deserialize, Serialize};

/// A WGS84 coordinate in decimal degrees
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Point {
    /// Latitude in decimal degrees
    pub lat: f64,
    /// Longitude in decimal degrees
    pub lon: f64,
}

impl Point {
    /// Create a new point
    #[must_use]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Finite and inside the latitude/longitude ranges
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    /// Round coordinates, e.g. for forecast lookups
    #[must_use]
    pub fn rounded(&self, precision: u32) -> Self {
        let multiplier = 10_f64.powi(i32::try_from(precision).unwrap_or(4));
        Self {
            lat: (self.lat * multiplier).round() / multiplier,
            lon: (self.lon * multiplier).round() / multiplier,
        }
    }

    /// Format point as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.lat, self.lon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, 0.0, true)]
    #[case(90.0, 180.0, true)]
    #[case(-90.0, -180.0, true)]
    #[case(90.1, 0.0, false)]
    #[case(0.0, -180.5, false)]
    #[case(f64::NAN, 0.0, false)]
    #[case(0.0, f64::INFINITY, false)]
    fn test_point_validity(#[case] lat: f64, #[case] lon: f64, #[case] valid: bool) {
        assert_eq!(Point::new(lat, lon).is_valid(), valid);
    }

    #[test]
    fn test_point_rounded() {
        let point = Point::new(45.123_456, 5.987_654).rounded(4);
        assert_eq!(point.lat, 45.1235);
        assert_eq!(point.lon, 5.9877);
    }

    #[test]
    fn test_point_format() {
        assert_eq!(Point::new(45.5, 5.25).format_coordinates(), "45.5000, 5.2500");
    }
}
