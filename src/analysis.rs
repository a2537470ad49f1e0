//! Route analysis pipeline
//!
//! `parse_track` turns GPX content into a simplified, segmented route.
//! `analyze_route` scores those segments against a forecast series.
//! [`RouteAnalysisService`] wraps both with request validation and the
//! forecast fetch.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, NaiveDateTime, Utc};
use chrono_tz::Tz;
use tracing::{debug, info, instrument};

use crate::config::{AnalysisConfig, WindRouteConfig};
use crate::models::weather::TIME_FORMAT;
use crate::models::{
    AnalysisRequest, AnalysisResponse, ParseResponse, Point, Segment, WeatherSeries,
};
use crate::track::{build_segments, classify_route, parse_gpx, route_center, simplify, total_distance};
use crate::wind::{base_time_minutes, dominant_wind, offset_time, score_route, summarize};
use crate::{Result, WindRouteError};

/// Name used when neither the upload nor the document names the route
pub const FALLBACK_ROUTE_NAME: &str = "route";

/// Source of hourly wind forecasts
#[async_trait]
pub trait ForecastProvider: Send + Sync {
    /// Forecast around `center` covering the day of `ride_start`
    async fn fetch_forecast(&self, center: Point, ride_start: NaiveDateTime)
    -> Result<WeatherSeries>;
}

/// Parse, simplify and segment a GPX document.
///
/// The route is named after the uploaded file, then the name declared in
/// the document, then [`FALLBACK_ROUTE_NAME`].
pub fn parse_track(
    file_name: Option<&str>,
    content: &str,
    config: &AnalysisConfig,
) -> Result<ParseResponse> {
    let track = parse_gpx(content)?;
    let points = simplify(&track.points, config.max_points, config.min_distance_km);
    let segments = build_segments(&points);

    let name = file_name
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(ToString::to_string)
        .or(track.name)
        .unwrap_or_else(|| FALLBACK_ROUTE_NAME.to_string());

    info!(
        "Parsed route '{}': {} points simplified to {}, {} segments",
        name,
        track.points.len(),
        points.len(),
        segments.len()
    );

    Ok(ParseResponse {
        name,
        total_distance: total_distance(&segments),
        total_points: points.len(),
        route_info: classify_route(&points),
        points,
        segments,
    })
}

/// Score a segmented route against a forecast series.
///
/// Pure: the same inputs always produce the same response.
pub fn analyze_route(
    segments: &[Segment],
    series: &WeatherSeries,
    ride_start: NaiveDateTime,
    rider_speed_kmh: f64,
) -> Result<AnalysisResponse> {
    let center_point = route_center(segments)
        .ok_or_else(|| WindRouteError::insufficient_data("Route has no segments"))?;

    let scored = score_route(segments, series, ride_start, rider_speed_kmh)?;
    let summary = summarize(&scored.segments);
    let dominant_wind = dominant_wind(series, ride_start, scored.total_time_minutes)?;

    debug!(
        "Scored {} segments, best direction {}",
        scored.segments.len(),
        summary.best_direction
    );

    Ok(AnalysisResponse {
        segments: scored.segments,
        center_point,
        dominant_wind,
        summary,
    })
}

/// Parse a ride start time; seconds are accepted but not required
pub fn parse_ride_datetime(raw: &str) -> Result<NaiveDateTime> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, TIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|_| {
            WindRouteError::invalid_input(format!(
                "Invalid datetime '{raw}', expected YYYY-MM-DDTHH:MM"
            ))
        })
}

/// Check an analysis request and extract the ride start and rider speed.
///
/// `now` is the current local time; the ride must start within
/// `[now - before, now + after]` and its end must be a representable time.
pub fn validate_request(
    request: &AnalysisRequest,
    now: NaiveDateTime,
    (before, after): (Duration, Duration),
) -> Result<(NaiveDateTime, f64)> {
    if request.segments.is_empty() {
        return Err(WindRouteError::invalid_input("No segments provided"));
    }

    for segment in &request.segments {
        if !segment.start.is_valid() || !segment.end.is_valid() {
            return Err(WindRouteError::invalid_input(format!(
                "Segment {} has invalid coordinates",
                segment.id
            )));
        }
        if !segment.distance_km.is_finite() || segment.distance_km < 0.0 {
            return Err(WindRouteError::invalid_input(format!(
                "Segment {} has an invalid distance",
                segment.id
            )));
        }
        if !(0.0..360.0).contains(&segment.bearing_deg) {
            return Err(WindRouteError::invalid_input(format!(
                "Segment {} has an invalid bearing",
                segment.id
            )));
        }
    }

    let speed = request.rider_speed;
    if !speed.is_finite() || speed <= 0.0 {
        return Err(WindRouteError::invalid_input(
            "rider_speed must be a positive number",
        ));
    }

    let ride_start = parse_ride_datetime(&request.datetime)?;
    if ride_start < now - before || ride_start > now + after {
        return Err(WindRouteError::out_of_range(format!(
            "{} is not between {} and {}",
            ride_start.format(TIME_FORMAT),
            (now - before).format(TIME_FORMAT),
            (now + after).format(TIME_FORMAT)
        )));
    }

    let ride_minutes: f64 = request
        .segments
        .iter()
        .map(|segment| base_time_minutes(segment.distance_km, speed))
        .sum();
    offset_time(ride_start, ride_minutes)?;

    Ok((ride_start, speed))
}

/// Validates requests, fetches the forecast and runs the pipeline
#[derive(Clone)]
pub struct RouteAnalysisService {
    provider: Arc<dyn ForecastProvider>,
    timezone: Tz,
    window: (Duration, Duration),
}

impl RouteAnalysisService {
    pub fn new(provider: Arc<dyn ForecastProvider>, config: &WindRouteConfig) -> Result<Self> {
        Ok(Self {
            provider,
            timezone: config.weather.tz()?,
            window: config.analysis.date_window(),
        })
    }

    /// Current wall-clock time in the configured zone
    #[must_use]
    pub fn local_now(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.timezone).naive_local()
    }

    /// Analyze a request against the forecast for the current date window
    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResponse> {
        self.analyze_at(request, self.local_now()).await
    }

    /// Same as [`Self::analyze`] with an explicit `now`
    #[instrument(skip(self, request), fields(segments = request.segments.len(), datetime = %request.datetime))]
    pub async fn analyze_at(
        &self,
        request: &AnalysisRequest,
        now: NaiveDateTime,
    ) -> Result<AnalysisResponse> {
        let (ride_start, rider_speed) = validate_request(request, now, self.window)?;
        let center = route_center(&request.segments)
            .ok_or_else(|| WindRouteError::invalid_input("No segments provided"))?;

        let series = self.provider.fetch_forecast(center, ride_start).await?;
        info!(
            "Forecast for {} has {} hourly samples",
            center.format_coordinates(),
            series.len()
        );

        analyze_route(&request.segments, &series, ride_start, rider_speed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Direction, RouteInfo, WindImpact};
    use std::sync::Mutex;

    const THREE_POINT_GPX: &str = r#"<?xml version="1.0"?>
<gpx version="1.1" creator="test">
  <metadata><name>Out and back</name></metadata>
  <trk><trkseg>
    <trkpt lat="45.0" lon="5.0"/>
    <trkpt lat="45.09" lon="5.0"/>
    <trkpt lat="45.0" lon="5.0"/>
  </trkseg></trk>
</gpx>"#;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, TIME_FORMAT).unwrap()
    }

    fn north_wind(start: &str, hours: usize, speed: f64) -> WeatherSeries {
        let start = ts(start);
        WeatherSeries {
            timestamps: (0..hours)
                .map(|h| Some(start + Duration::hours(h as i64)))
                .collect(),
            wind_speed: vec![Some(speed); hours],
            wind_direction: vec![Some(0.0); hours],
            temperature: vec![Some(18.0); hours],
        }
    }

    struct StubProvider {
        series: WeatherSeries,
        calls: Mutex<Vec<(Point, NaiveDateTime)>>,
    }

    #[async_trait]
    impl ForecastProvider for StubProvider {
        async fn fetch_forecast(
            &self,
            center: Point,
            ride_start: NaiveDateTime,
        ) -> Result<WeatherSeries> {
            self.calls.lock().unwrap().push((center, ride_start));
            Ok(self.series.clone())
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl ForecastProvider for FailingProvider {
        async fn fetch_forecast(&self, _center: Point, _ride_start: NaiveDateTime) -> Result<WeatherSeries> {
            Err(WindRouteError::external("HTTP 503"))
        }
    }

    #[test]
    fn test_parse_track_names_and_shape() {
        let config = AnalysisConfig::default();

        let parsed = parse_track(Some("ride.gpx"), THREE_POINT_GPX, &config).unwrap();
        assert_eq!(parsed.name, "ride.gpx");
        assert_eq!(parsed.total_points, 3);
        assert_eq!(parsed.segments.len(), 2);
        assert!(matches!(parsed.route_info, RouteInfo::Loop { .. }));
        assert!((parsed.total_distance - 20.01).abs() < 0.02);

        let parsed = parse_track(None, THREE_POINT_GPX, &config).unwrap();
        assert_eq!(parsed.name, "Out and back");

        let unnamed = THREE_POINT_GPX.replace("<metadata><name>Out and back</name></metadata>", "");
        let parsed = parse_track(Some("  "), &unnamed, &config).unwrap();
        assert_eq!(parsed.name, FALLBACK_ROUTE_NAME);
    }

    #[test]
    fn test_parse_track_rejects_single_point() {
        let gpx = r#"<gpx><trk><trkseg><trkpt lat="45.0" lon="5.0"/></trkseg></trk></gpx>"#;
        let err = parse_track(None, gpx, &AnalysisConfig::default()).unwrap_err();
        assert!(matches!(err, WindRouteError::InsufficientData { .. }));
    }

    #[test]
    fn test_out_and_back_into_north_wind() {
        let parsed = parse_track(None, THREE_POINT_GPX, &AnalysisConfig::default()).unwrap();
        let series = north_wind("2024-06-01T00:00", 48, 10.0);

        let response =
            analyze_route(&parsed.segments, &series, ts("2024-06-01T09:00"), 20.0).unwrap();

        let northbound = &response.segments[0];
        let southbound = &response.segments[1];
        assert_eq!(northbound.normal.impact, WindImpact::Unfavorable);
        assert_eq!(southbound.normal.impact, WindImpact::Favorable);
        assert_eq!(northbound.reverse.impact, WindImpact::Favorable);
        assert_eq!(southbound.reverse.impact, WindImpact::Unfavorable);

        let summary = &response.summary;
        let expected = if summary.total_time_normal <= summary.total_time_reverse {
            Direction::Normal
        } else {
            Direction::Reverse
        };
        assert_eq!(summary.best_direction, expected);
        assert_eq!(summary.favorable_segments_normal, 1);
        assert_eq!(summary.favorable_segments_reverse, 1);
        assert_eq!(response.dominant_wind.direction, 0.0);
        assert_eq!(response.dominant_wind.speed, 10.0);
        assert!((response.center_point.lat - 45.045).abs() < 1e-9);
    }

    #[test]
    fn test_analysis_is_idempotent() {
        let parsed = parse_track(None, THREE_POINT_GPX, &AnalysisConfig::default()).unwrap();
        let series = north_wind("2024-06-01T00:00", 48, 17.0);
        let start = ts("2024-06-01T07:20");

        let first = analyze_route(&parsed.segments, &series, start, 22.5).unwrap();
        let second = analyze_route(&parsed.segments, &series, start, 22.5).unwrap();
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_analyze_route_without_segments() {
        let err = analyze_route(&[], &WeatherSeries::default(), ts("2024-06-01T07:00"), 20.0)
            .unwrap_err();
        assert!(matches!(err, WindRouteError::InsufficientData { .. }));
    }

    fn request(datetime: &str, rider_speed: f64) -> AnalysisRequest {
        let parsed = parse_track(None, THREE_POINT_GPX, &AnalysisConfig::default()).unwrap();
        AnalysisRequest {
            segments: parsed.segments,
            datetime: datetime.to_string(),
            rider_speed,
        }
    }

    #[test]
    fn test_validate_request() {
        let now = ts("2024-06-01T12:00");
        let window = AnalysisConfig::default().date_window();

        let (start, speed) = validate_request(&request("2024-06-02T08:30", 24.0), now, window).unwrap();
        assert_eq!(start, ts("2024-06-02T08:30"));
        assert_eq!(speed, 24.0);

        let (start, _) = validate_request(&request("2024-06-02T08:30:45", 24.0), now, window).unwrap();
        assert_eq!(start.format("%S").to_string(), "45");

        let err = validate_request(&request("2024-06-02 08:30", 24.0), now, window).unwrap_err();
        assert!(matches!(err, WindRouteError::InvalidInput { .. }));

        let err = validate_request(&request("2024-06-02T08:30", 0.0), now, window).unwrap_err();
        assert!(matches!(err, WindRouteError::InvalidInput { .. }));

        let err = validate_request(&request("2024-06-09T12:01", 20.0), now, window).unwrap_err();
        assert!(matches!(err, WindRouteError::OutOfRangeDateTime { .. }));

        let err = validate_request(&request("2024-05-31T11:59", 20.0), now, window).unwrap_err();
        assert!(matches!(err, WindRouteError::OutOfRangeDateTime { .. }));
    }

    #[test]
    fn test_validate_request_rejects_bad_segments() {
        let now = ts("2024-06-01T12:00");
        let window = AnalysisConfig::default().date_window();

        let mut empty = request("2024-06-01T14:00", 20.0);
        empty.segments.clear();
        assert!(validate_request(&empty, now, window).is_err());

        let mut bad_point = request("2024-06-01T14:00", 20.0);
        bad_point.segments[0].start = Point::new(95.0, 5.0);
        assert!(validate_request(&bad_point, now, window).is_err());

        let mut bad_bearing = request("2024-06-01T14:00", 20.0);
        bad_bearing.segments[1].bearing_deg = 360.0;
        assert!(validate_request(&bad_bearing, now, window).is_err());
    }

    #[test]
    fn test_validate_request_rejects_endless_rides() {
        let now = ts("2024-06-01T12:00");
        let window = AnalysisConfig::default().date_window();

        let err = validate_request(&request("2024-06-01T14:00", 1e-9), now, window).unwrap_err();
        assert!(matches!(err, WindRouteError::InvalidInput { .. }));

        let mut far = request("2024-06-01T14:00", 20.0);
        far.segments[0].distance_km = 1e300;
        let err = validate_request(&far, now, window).unwrap_err();
        assert!(matches!(err, WindRouteError::InvalidInput { .. }));
    }

    #[test]
    fn test_analyze_route_with_crawling_rider_errors() {
        let parsed = parse_track(None, THREE_POINT_GPX, &AnalysisConfig::default()).unwrap();
        let series = north_wind("2024-06-01T00:00", 48, 10.0);

        let err = analyze_route(&parsed.segments, &series, ts("2024-06-01T09:00"), 1e-9)
            .unwrap_err();
        assert!(matches!(err, WindRouteError::InvalidInput { .. }));
    }

    #[tokio::test]
    async fn test_service_fetches_forecast_at_route_center() {
        let provider = Arc::new(StubProvider {
            series: north_wind("2024-06-01T00:00", 48, 10.0),
            calls: Mutex::new(Vec::new()),
        });
        let service = RouteAnalysisService::new(provider.clone(), &WindRouteConfig::default()).unwrap();

        let response = service
            .analyze_at(&request("2024-06-01T09:00", 20.0), ts("2024-06-01T08:00"))
            .await
            .unwrap();
        assert_eq!(response.segments.len(), 2);

        let calls = provider.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, response.center_point);
        assert_eq!(calls[0].1, ts("2024-06-01T09:00"));
    }

    #[tokio::test]
    async fn test_service_propagates_forecast_failure() {
        let service =
            RouteAnalysisService::new(Arc::new(FailingProvider), &WindRouteConfig::default()).unwrap();
        let err = service
            .analyze_at(&request("2024-06-01T09:00", 20.0), ts("2024-06-01T08:00"))
            .await
            .unwrap_err();
        assert!(matches!(err, WindRouteError::ExternalService { .. }));
    }

    #[tokio::test]
    async fn test_service_rejects_endless_ride_before_fetching() {
        let provider = Arc::new(StubProvider {
            series: north_wind("2024-06-01T00:00", 48, 10.0),
            calls: Mutex::new(Vec::new()),
        });
        let service = RouteAnalysisService::new(provider.clone(), &WindRouteConfig::default()).unwrap();

        let err = service
            .analyze_at(&request("2024-06-01T09:00", 1e-9), ts("2024-06-01T08:00"))
            .await
            .unwrap_err();
        assert!(matches!(err, WindRouteError::InvalidInput { .. }));
        assert!(provider.calls.lock().unwrap().is_empty());
    }
}
