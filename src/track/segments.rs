//! Segment building and route shape classification

use crate::geometry::{self, round_to};
use crate::models::{Point, RouteInfo, Segment};

/// Start and end closer than this make the route a loop, km
pub const LOOP_THRESHOLD_KM: f64 = 0.5;

/// One segment per consecutive pair of points
#[must_use]
pub fn build_segments(points: &[Point]) -> Vec<Segment> {
    points
        .windows(2)
        .enumerate()
        .map(|(id, pair)| {
            let (start, end) = (pair[0], pair[1]);
            let bearing = geometry::bearing(&start, &end);
            Segment {
                id,
                start,
                end,
                distance_km: round_to(geometry::distance(&start, &end), 3),
                bearing_deg: geometry::normalize_degrees(round_to(bearing, 1)),
                bearing_text: geometry::compass16(bearing).to_string(),
            }
        })
        .collect()
}

/// Classify the route as a loop or a linear route from its end points
#[must_use]
pub fn classify_route(points: &[Point]) -> RouteInfo {
    if points.len() < 2 {
        return RouteInfo::Unknown {
            description: "Route shape undetermined".to_string(),
        };
    }
    let (start, end) = (&points[0], &points[points.len() - 1]);

    if geometry::distance(start, end) < LOOP_THRESHOLD_KM {
        return RouteInfo::Loop {
            description: "Loop route - both directions are worth comparing".to_string(),
            is_loop: true,
        };
    }

    let bearing = geometry::bearing(start, end);
    let direction = geometry::compass8(bearing).to_string();
    RouteInfo::Linear {
        description: format!("Linear route heading {direction}"),
        direction,
        bearing: round_to(bearing, 1),
        is_loop: false,
    }
}

/// Mean of the segment start points, `None` for an empty route
#[must_use]
pub fn route_center(segments: &[Segment]) -> Option<Point> {
    if segments.is_empty() {
        return None;
    }
    let count = segments.len() as f64;
    let (lat, lon) = segments
        .iter()
        .fold((0.0, 0.0), |(lat, lon), s| (lat + s.start.lat, lon + s.start.lon));
    Some(Point::new(lat / count, lon / count))
}

/// Sum of segment distances, 2 decimals
#[must_use]
pub fn total_distance(segments: &[Segment]) -> f64 {
    round_to(segments.iter().map(|s| s.distance_km).sum(), 2)
}
