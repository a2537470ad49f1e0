//! Wind scoring along a ride
//!
//! - Forecast alignment onto arrival times
//! - Per-direction impact model
//! - Route timeline and scoring
//! - Round-trip summary and dominant wind

pub mod aligner;
pub mod dominant;
pub mod impact;
pub mod summary;
pub mod timeline;

pub use aligner::align;
pub use dominant::{circular_mean, dominant_wind};
pub use impact::{WindEffect, base_time_minutes, relative_angle, reverse_bearing};
pub use summary::summarize;
pub use timeline::{ScoredRoute, offset_time, score_route, score_segment};
