//! Open-Meteo forecast client

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{Days, NaiveDateTime};
use reqwest::Client;
use tracing::{debug, error, info, instrument, warn};

use crate::analysis::ForecastProvider;
use crate::config::WeatherConfig;
use crate::models::{Point, WeatherSeries};
use crate::{Result, WindRouteError};

/// Hourly variables requested from Open-Meteo
pub const HOURLY_VARIABLES: &str = "wind_speed_10m,wind_direction_10m,temperature_2m";
/// Decimal places kept on the forecast location
const COORDINATE_PRECISION: u32 = 4;

/// Forecast client for the Open-Meteo `/forecast` endpoint
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    client: Client,
    base_url: String,
    timezone: String,
}

impl OpenMeteoClient {
    /// Create a new client from the weather configuration
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| WindRouteError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timezone: config.timezone.clone(),
        })
    }

    /// Query parameters for a forecast around `center` on the ride date, one day either side
    #[must_use]
    pub fn query_params(&self, center: Point, ride_start: NaiveDateTime) -> Vec<(&'static str, String)> {
        let location = center.rounded(COORDINATE_PRECISION);
        let ride_date = ride_start.date();
        let start_date = ride_date.checked_sub_days(Days::new(1)).unwrap_or(ride_date);
        let end_date = ride_date.checked_add_days(Days::new(1)).unwrap_or(ride_date);

        vec![
            ("latitude", location.lat.to_string()),
            ("longitude", location.lon.to_string()),
            ("hourly", HOURLY_VARIABLES.to_string()),
            ("timezone", self.timezone.clone()),
            ("start_date", start_date.format("%Y-%m-%d").to_string()),
            ("end_date", end_date.format("%Y-%m-%d").to_string()),
        ]
    }
}

#[async_trait]
impl ForecastProvider for OpenMeteoClient {
    #[instrument(skip(self), fields(lat = center.lat, lon = center.lon))]
    async fn fetch_forecast(
        &self,
        center: Point,
        ride_start: NaiveDateTime,
    ) -> Result<WeatherSeries> {
        let url = format!("{}/forecast", self.base_url);
        let params = self.query_params(center, ride_start);
        debug!("OpenMeteo forecast request: {} {:?}", url, params);

        let start_time = Instant::now();
        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| {
                error!("Forecast request failed: {}", e);
                WindRouteError::external(format!("Forecast request failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let reason = serde_json::from_str::<openmeteo::ForecastResponse>(&body)
                .ok()
                .and_then(|r| r.reason)
                .unwrap_or(body);
            error!("OpenMeteo returned {}: {}", status, reason);
            return Err(WindRouteError::external(format!(
                "OpenMeteo returned {status}: {reason}"
            )));
        }

        let forecast: openmeteo::ForecastResponse = response.json().await.map_err(|e| {
            error!("Failed to parse forecast response: {}", e);
            WindRouteError::external(format!("Invalid forecast payload: {e}"))
        })?;

        let series = forecast.into_series()?;

        let elapsed = start_time.elapsed();
        info!(
            "Retrieved {} hourly samples in {:.3}s",
            series.len(),
            elapsed.as_secs_f64()
        );
        if elapsed.as_secs() > 5 {
            warn!("Slow forecast response: {:.3}s", elapsed.as_secs_f64());
        }

        Ok(series)
    }
}

/// `OpenMeteo` API response structures and conversion utilities
pub mod openmeteo {
    use serde::Deserialize;

    use crate::models::WeatherSeries;
    use crate::{Result, WindRouteError};

    /// Forecast response from `OpenMeteo`
    #[derive(Debug, Deserialize)]
    pub struct ForecastResponse {
        pub latitude: Option<f64>,
        pub longitude: Option<f64>,
        pub timezone: Option<String>,
        pub hourly: Option<HourlyData>,
        /// Set together with `error: true` on failed requests
        pub reason: Option<String>,
    }

    /// Hourly series; any value may be `null`
    #[derive(Debug, Deserialize)]
    pub struct HourlyData {
        #[serde(default)]
        pub time: Vec<String>,
        #[serde(default)]
        pub wind_speed_10m: Vec<Option<f64>>,
        #[serde(default)]
        pub wind_direction_10m: Vec<Option<f64>>,
        #[serde(default)]
        pub temperature_2m: Vec<Option<f64>>,
    }

    impl From<HourlyData> for WeatherSeries {
        fn from(hourly: HourlyData) -> Self {
            Self {
                timestamps: WeatherSeries::parse_timestamps(&hourly.time),
                wind_speed: hourly.wind_speed_10m,
                wind_direction: hourly.wind_direction_10m,
                temperature: hourly.temperature_2m,
            }
        }
    }

    impl ForecastResponse {
        /// Hourly data as a series; a payload without `hourly` is an error
        pub fn into_series(self) -> Result<WeatherSeries> {
            self.hourly
                .map(WeatherSeries::from)
                .ok_or_else(|| WindRouteError::external("Forecast response has no hourly data"))
        }
    }
}
