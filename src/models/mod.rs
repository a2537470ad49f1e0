//! Data models for the WindRoute application
//!
//! This module contains the core domain models organized by concern:
//! - Point: Geographic coordinates
//! - Segment: Directed route legs and route shape
//! - Weather: Hourly forecast series
//! - Analysis: Per-segment wind scoring, summaries and API payloads

pub mod analysis;
pub mod point;
pub mod segment;
pub mod weather;

// Re-export all public types for convenient access
pub use analysis::{
    AnalysisRequest, AnalysisResponse, Direction, DirectionalImpact, DominantWind, ParseResponse,
    RouteSummary, SegmentAnalysis, TimeSpan, WindImpact,
};
pub use point::Point;
pub use segment::{RouteInfo, Segment};
pub use weather::{WeatherSample, WeatherSeries};
