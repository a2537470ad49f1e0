//! Spherical-earth geometry: distances, bearings and compass labels

use haversine::{Location as HaversineLocation, Units, distance as haversine_distance};

use crate::models::Point;

const COMPASS_16: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

const COMPASS_8: [&str; 8] = [
    "North",
    "North-East",
    "East",
    "South-East",
    "South",
    "South-West",
    "West",
    "North-West",
];

/// Great-circle distance in km (haversine, R = 6371 km)
#[must_use]
pub fn distance(a: &Point, b: &Point) -> f64 {
    let from = HaversineLocation {
        latitude: a.lat,
        longitude: a.lon,
    };
    let to = HaversineLocation {
        latitude: b.lat,
        longitude: b.lon,
    };
    haversine_distance(from, to, Units::Kilometers)
}

/// Initial bearing from `a` toward `b` in `[0, 360)`
#[must_use]
pub fn bearing(a: &Point, b: &Point) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let y = d_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();

    normalize_degrees(y.atan2(x).to_degrees())
}

/// Wrap any angle into `[0, 360)`
#[must_use]
pub fn normalize_degrees(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can land on 360.0 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Nearest of the 16 compass points (22.5° sectors)
#[must_use]
pub fn compass16(bearing: f64) -> &'static str {
    let index = (normalize_degrees(bearing) / 22.5).round() as usize % 16;
    COMPASS_16[index]
}

/// Octant name; North covers `[337.5, 360) ∪ [0, 22.5)`
#[must_use]
pub fn compass8(bearing: f64) -> &'static str {
    let index = ((normalize_degrees(bearing) + 22.5) / 45.0).floor() as usize % 8;
    COMPASS_8[index]
}

/// Round half away from zero to `decimals` places
#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let multiplier = 10_f64.powi(decimals);
    (value * multiplier).round() / multiplier
}
