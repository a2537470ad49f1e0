use quick_xml::Reader;
use quick_xml::de::from_str;
use quick_xml::events::Event;
use serde::Deserialize;
use std::fmt;
use tracing::{debug, info, warn};

use crate::models::Point;
use crate::{Result, WindRouteError};

/// GPX document structure for deserialization
#[derive(Debug, Default, Deserialize)]
pub struct GpxDocument {
    /// GPX 1.0 puts the name directly under the root
    pub name: Option<String>,
    pub metadata: Option<GpxMetadata>,
    #[serde(rename = "wpt", default)]
    pub waypoints: Vec<GpxPoint>,
    #[serde(rename = "rte", default)]
    pub routes: Vec<GpxRoute>,
    #[serde(rename = "trk", default)]
    pub tracks: Vec<GpxTrack>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GpxMetadata {
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GpxTrack {
    pub name: Option<String>,
    #[serde(rename = "trkseg", default)]
    pub segments: Vec<GpxTrackSegment>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GpxTrackSegment {
    #[serde(rename = "trkpt", default)]
    pub points: Vec<GpxPoint>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GpxRoute {
    pub name: Option<String>,
    #[serde(rename = "rtept", default)]
    pub points: Vec<GpxPoint>,
}

/// `wpt`, `rtept` and `trkpt` all carry their position as attributes
#[derive(Debug, Default, Deserialize)]
pub struct GpxPoint {
    #[serde(rename = "@lat")]
    pub lat: Option<String>,
    #[serde(rename = "@lon")]
    pub lon: Option<String>,
}

/// Which part of the GPX document the points came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointSource {
    Track,
    Route,
    Waypoints,
}

/// Ordered coordinates extracted from a GPX document
#[derive(Debug, Clone)]
pub struct ExtractedTrack {
    /// Name declared inside the document, if any
    pub name: Option<String>,
    pub points: Vec<Point>,
    pub source: PointSource,
}

impl GpxPoint {
    /// Parse lat/lon attributes; `None` if missing, unparsable or out of range
    pub fn to_point(&self) -> Option<Point> {
        let lat = self.lat.as_deref()?.trim().parse::<f64>().ok()?;
        let lon = self.lon.as_deref()?.trim().parse::<f64>().ok()?;
        let point = Point::new(lat, lon);
        point.is_valid().then_some(point)
    }
}

impl GpxDocument {
    /// All `trk/trkseg/trkpt` points, in document order
    pub fn track_points(&self) -> Vec<Point> {
        collect_points(
            self.tracks
                .iter()
                .flat_map(|track| &track.segments)
                .flat_map(|segment| &segment.points),
        )
    }

    /// All `rte/rtept` points, in document order
    pub fn route_points(&self) -> Vec<Point> {
        collect_points(self.routes.iter().flat_map(|route| &route.points))
    }

    /// All top-level `wpt` points
    pub fn waypoints(&self) -> Vec<Point> {
        collect_points(self.waypoints.iter())
    }

    /// First name found in metadata, root, tracks, then routes
    pub fn declared_name(&self) -> Option<String> {
        self.metadata
            .as_ref()
            .and_then(|m| m.name.clone())
            .or_else(|| self.name.clone())
            .or_else(|| self.tracks.iter().find_map(|t| t.name.clone()))
            .or_else(|| self.routes.iter().find_map(|r| r.name.clone()))
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
    }

    /// Points of the highest-priority non-empty category: tracks, routes, waypoints.
    /// Categories are never merged.
    pub fn extract(&self) -> Option<(PointSource, Vec<Point>)> {
        let extractors: [(PointSource, fn(&Self) -> Vec<Point>); 3] = [
            (PointSource::Track, Self::track_points),
            (PointSource::Route, Self::route_points),
            (PointSource::Waypoints, Self::waypoints),
        ];

        extractors.into_iter().find_map(|(source, extractor)| {
            let points = extractor(self);
            (!points.is_empty()).then_some((source, points))
        })
    }
}

fn collect_points<'a>(raw: impl Iterator<Item = &'a GpxPoint>) -> Vec<Point> {
    let mut skipped = 0;
    let points: Vec<Point> = raw
        .filter_map(|p| {
            let point = p.to_point();
            if point.is_none() {
                skipped += 1;
            }
            point
        })
        .collect();

    if skipped > 0 {
        warn!("Skipped {} GPX points with missing or invalid coordinates", skipped);
    }
    points
}

/// Decode raw GPX bytes using the byte order mark or the encoding named in
/// the XML declaration, UTF-8 when neither is present
pub fn decode_gpx(bytes: &[u8]) -> Result<String> {
    let mut reader = Reader::from_reader(bytes);
    let mut buf = Vec::new();
    // The declaration is the first event; reading it selects the decoder
    if let Err(e) = reader.read_event_into(&mut buf) {
        debug!("No readable XML declaration: {}", e);
    }

    let decoder = reader.decoder();
    let content = decoder
        .decode(bytes)
        .map_err(|e| WindRouteError::invalid_input(format!("Cannot decode GPX file: {e}")))?;

    Ok(content.trim_start_matches('\u{feff}').to_string())
}

/// Parse GPX content and extract the route points
pub fn parse_gpx(content: &str) -> Result<ExtractedTrack> {
    debug!("Parsing GPX content ({} bytes)", content.len());

    let document: GpxDocument = from_str(content)
        .map_err(|e| WindRouteError::invalid_input(format!("Invalid GPX file: {e}")))?;

    let (source, points) = document.extract().unwrap_or((PointSource::Track, Vec::new()));

    if points.len() < 2 {
        return Err(WindRouteError::insufficient_data(format!(
            "GPX file has {} usable point(s), at least 2 are required",
            points.len()
        )));
    }

    info!("Extracted {} points from GPX {}", points.len(), source);

    Ok(ExtractedTrack {
        name: document.declared_name(),
        points,
        source,
    })
}

impl fmt::Display for PointSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointSource::Track => write!(f, "tracks"),
            PointSource::Route => write!(f, "routes"),
            PointSource::Waypoints => write!(f, "waypoints"),
        }
    }
}
