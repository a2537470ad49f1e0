//! Track module
//!
//! Turns an uploaded GPX document into the scored route's geometry:
//! - GPX point extraction with track > route > waypoint priority
//! - Route simplification
//! - Segment building, route shape and center

pub mod gpx;
pub mod segments;
pub mod simplify;

pub use gpx::{ExtractedTrack, GpxDocument, PointSource, decode_gpx, parse_gpx};
pub use segments::{build_segments, classify_route, route_center, total_distance};
pub use simplify::{DEFAULT_MAX_POINTS, DEFAULT_MIN_DISTANCE_KM, simplify};
