//! Dominant wind over the ride window

use chrono::NaiveDateTime;
use tracing::debug;

use super::aligner::align;
use super::timeline::offset_time;
use crate::geometry::{compass16, normalize_degrees, round_to};
use crate::Result;
use crate::models::{DominantWind, TimeSpan, WeatherSeries};

/// Below this resultant length the directions cancel out
const MIN_RESULTANT: f64 = 1e-9;

/// Circular mean of compass directions in degrees.
///
/// Falls back to the arithmetic mean when the unit vectors cancel
/// (e.g. exactly opposite directions).
#[must_use]
pub fn circular_mean(directions: &[f64]) -> Option<f64> {
    if directions.is_empty() {
        return None;
    }

    let (sin_sum, cos_sum) = directions.iter().fold((0.0, 0.0), |(s, c), d| {
        let rad = d.to_radians();
        (s + rad.sin(), c + rad.cos())
    });

    if sin_sum.hypot(cos_sum) < MIN_RESULTANT {
        let mean = directions.iter().sum::<f64>() / directions.len() as f64;
        return Some(normalize_degrees(mean));
    }

    Some(normalize_degrees(sin_sum.atan2(cos_sum).to_degrees()))
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Average wind over the samples spanning `[ride_start, ride_start + total_minutes]`
pub fn dominant_wind(
    series: &WeatherSeries,
    ride_start: NaiveDateTime,
    total_minutes: f64,
) -> Result<DominantWind> {
    let ride_end = offset_time(ride_start, total_minutes)?;
    let last = series.len().saturating_sub(1);

    let start_index = align(series, ride_start).min(last);
    let end_index = align(series, ride_end).min(last).max(start_index);
    debug!(
        "Dominant wind over forecast samples {}..={}",
        start_index, end_index
    );

    let window = start_index..=end_index;
    let speeds: Vec<f64> = series
        .wind_speed
        .get(window.clone())
        .unwrap_or_default()
        .iter()
        .flatten()
        .copied()
        .collect();
    let directions: Vec<f64> = series
        .wind_direction
        .get(window)
        .unwrap_or_default()
        .iter()
        .flatten()
        .copied()
        .collect();

    let speed = mean(&speeds).unwrap_or_else(|| series.wind_speed_at(0));
    let direction = circular_mean(&directions).unwrap_or_else(|| series.wind_direction_at(0));

    Ok(DominantWind {
        speed: round_to(speed, 1),
        direction: normalize_degrees(direction.round()),
        direction_text: compass16(direction).to_string(),
        time_span: TimeSpan {
            start: ride_start,
            end: ride_end,
            duration_minutes: round_to(total_minutes, 1),
        },
    })
}
