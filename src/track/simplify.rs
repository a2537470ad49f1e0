//! Route decimation

use tracing::debug;

use crate::geometry;
use crate::models::Point;

/// Default upper bound on points kept by [`simplify`]
pub const DEFAULT_MAX_POINTS: usize = 200;
/// Default minimum spacing between kept points, km
pub const DEFAULT_MIN_DISTANCE_KM: f64 = 0.1;

/// Thin `points` down to roughly `max_points`.
///
/// Routes already within budget are returned unchanged. Otherwise every
/// `step`-th point is a candidate and is only kept when it lies at least
/// `min_distance_km` from the last kept point, so dense clusters collapse
/// while sparse stretches keep every candidate. The first and last points
/// are always kept.
#[must_use]
pub fn simplify(points: &[Point], max_points: usize, min_distance_km: f64) -> Vec<Point> {
    let max_points = max_points.max(1);
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return points.to_vec();
    };
    if points.len() <= max_points {
        return points.to_vec();
    }

    let step = (points.len() / max_points).max(1);
    let mut simplified = vec![*first];

    for candidate in points[..points.len() - 1].iter().skip(step).step_by(step) {
        let last_kept = simplified[simplified.len() - 1];
        if geometry::distance(&last_kept, candidate) >= min_distance_km {
            simplified.push(*candidate);
        }
    }

    simplified.push(*last);

    debug!(
        "Simplified route: {} -> {} points (step {})",
        points.len(),
        simplified.len(),
        step
    );

    simplified
}
