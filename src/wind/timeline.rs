//! Temporal evolution of the wind along a ride
//!
//! Each segment is scored against the forecast for the moment the rider
//! actually reaches it. Arrival times come from a cumulative cursor of
//! forward-direction base times; the reverse direction is scored against
//! the same per-segment wind samples rather than a separately re-walked
//! reverse timeline.
//!
//! The cursor is a prefix sum, so scoring runs in two phases: base times and
//! cursors are computed first, then segments are scored independently in
//! parallel. The result is identical to a sequential walk.

use chrono::{NaiveDateTime, TimeDelta};
use rayon::prelude::*;

use super::aligner::align;
use super::impact::{WindEffect, base_time_minutes, reverse_bearing};
use crate::geometry::{compass16, normalize_degrees, round_to};
use crate::models::{DirectionalImpact, Segment, SegmentAnalysis, WeatherSeries};
use crate::{Result, WindRouteError};

/// Scored segments plus the forward ride duration they imply
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRoute {
    pub segments: Vec<SegmentAnalysis>,
    /// Sum of forward base times, minutes
    pub total_time_minutes: f64,
}

/// `start` shifted by `minutes`, to the nearest second.
///
/// Fails when the offset leaves the representable date range.
pub fn offset_time(start: NaiveDateTime, minutes: f64) -> Result<NaiveDateTime> {
    let seconds = (minutes * 60.0).round();
    seconds
        .is_finite()
        .then(|| TimeDelta::try_seconds(seconds as i64))
        .flatten()
        .and_then(|offset| start.checked_add_signed(offset))
        .ok_or_else(|| {
            WindRouteError::invalid_input(format!(
                "Ride time of {minutes:.0} minutes is out of range, check segment distances and rider speed"
            ))
        })
}

/// Score every segment against the forecast at its arrival time.
///
/// `rider_speed_kmh` must be positive. Fails when an arrival time cannot be
/// represented.
pub fn score_route(
    segments: &[Segment],
    series: &WeatherSeries,
    ride_start: NaiveDateTime,
    rider_speed_kmh: f64,
) -> Result<ScoredRoute> {
    // Phase 1: windless base times (presented and accumulated at 2 decimals)
    let base_times: Vec<f64> = segments
        .iter()
        .map(|s| round_to(base_time_minutes(s.distance_km, rider_speed_kmh), 2))
        .collect();

    // Phase 2: exclusive prefix sum -> elapsed minutes on reaching each segment
    let cursors: Vec<f64> = base_times
        .iter()
        .scan(0.0, |elapsed, base| {
            let at = *elapsed;
            *elapsed += base;
            Some(at)
        })
        .collect();
    let total_time_minutes: f64 = base_times.iter().sum();
    offset_time(ride_start, total_time_minutes)?;

    // Phase 3: independent lookups and scoring
    let scored = segments
        .par_iter()
        .zip(cursors.par_iter())
        .map(|(segment, &cursor)| {
            score_segment(segment, series, ride_start, cursor, rider_speed_kmh)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ScoredRoute {
        segments: scored,
        total_time_minutes,
    })
}

/// Score one segment reached `cumulative_minutes` after `ride_start`
pub fn score_segment(
    segment: &Segment,
    series: &WeatherSeries,
    ride_start: NaiveDateTime,
    cumulative_minutes: f64,
    rider_speed_kmh: f64,
) -> Result<SegmentAnalysis> {
    let arrival = offset_time(ride_start, cumulative_minutes)?;
    let index = align(series, arrival);
    let wind_speed = series.wind_speed_at(index);
    let wind_direction = series.wind_direction_at(index);

    let base_time = base_time_minutes(segment.distance_km, rider_speed_kmh);
    let directional = |bearing: f64| {
        let effect = WindEffect::evaluate(bearing, wind_direction, wind_speed);
        DirectionalImpact {
            impact: effect.impact,
            factor: round_to(effect.factor, 3),
            estimated_time_minutes: round_to(effect.estimated_time(base_time), 2),
        }
    };

    Ok(SegmentAnalysis {
        segment: segment.clone(),
        segment_datetime: arrival,
        cumulative_time: round_to(cumulative_minutes, 2),
        base_time_minutes: round_to(base_time, 2),
        wind_speed: round_to(wind_speed, 1),
        wind_direction: normalize_degrees(wind_direction.round()),
        wind_direction_text: compass16(wind_direction).to_string(),
        normal: directional(segment.bearing_deg),
        reverse: directional(reverse_bearing(segment.bearing_deg)),
    })
}
