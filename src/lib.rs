//! `windroute` - Pick the direction to ride a route with the least wind
//!
//! This library parses GPX tracks into segments, scores every segment
//! against an hourly wind forecast at the time the rider reaches it, and
//! compares riding the route forward and in reverse.

pub mod analysis;
pub mod api;
pub mod config;
pub mod error;
pub mod geometry;
pub mod models;
pub mod track;
pub mod weather;
pub mod web;
pub mod wind;

// Re-export core types for public API
pub use analysis::{ForecastProvider, RouteAnalysisService, analyze_route, parse_track};
pub use config::WindRouteConfig;
pub use error::WindRouteError;
pub use models::{AnalysisRequest, AnalysisResponse, ParseResponse, Point, Segment, WeatherSeries};
pub use weather::OpenMeteoClient;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, WindRouteError>;
