//! Hourly forecast series and individual samples

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Wind speed used when the forecast has no value for the selected hour
pub const DEFAULT_WIND_SPEED_KMH: f64 = 15.0;
/// Wind direction used when the forecast has no value for the selected hour
pub const DEFAULT_WIND_DIRECTION_DEG: f64 = 180.0;

/// Wire format of forecast timestamps (local time of the configured zone)
pub const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// One hour of forecast data
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WeatherSample {
    /// Local timestamp of this sample
    pub timestamp: Option<NaiveDateTime>,
    /// Wind speed at 10 m in km/h
    pub wind_speed_kmh: Option<f64>,
    /// Direction the wind blows from, degrees (0 = north)
    pub wind_direction_deg: Option<f64>,
    /// Temperature at 2 m in Celsius
    pub temperature_c: Option<f64>,
}

/// Forecast as parallel arrays, ordered by timestamp.
///
/// Arrays may have different lengths and hold gaps; readers go through
/// [`WeatherSeries::wind_speed_at`] and friends, which never panic.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct WeatherSeries {
    /// `None` where the upstream timestamp could not be parsed
    pub timestamps: Vec<Option<NaiveDateTime>>,
    pub wind_speed: Vec<Option<f64>>,
    pub wind_direction: Vec<Option<f64>>,
    pub temperature: Vec<Option<f64>>,
}

impl WeatherSeries {
    /// Parse raw `YYYY-MM-DDTHH:MM` strings, keeping index alignment
    #[must_use]
    pub fn parse_timestamps(raw: &[String]) -> Vec<Option<NaiveDateTime>> {
        raw.iter()
            .map(|t| NaiveDateTime::parse_from_str(t, TIME_FORMAT).ok())
            .collect()
    }

    /// Number of wind samples
    #[must_use]
    pub fn len(&self) -> usize {
        self.wind_speed.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.wind_speed.is_empty()
    }

    #[must_use]
    pub fn has_timestamps(&self) -> bool {
        !self.timestamps.is_empty()
    }

    /// Raw sample at `index`, all fields `None` when out of range
    #[must_use]
    pub fn sample(&self, index: usize) -> WeatherSample {
        WeatherSample {
            timestamp: self.timestamps.get(index).copied().flatten(),
            wind_speed_kmh: self.wind_speed.get(index).copied().flatten(),
            wind_direction_deg: self.wind_direction.get(index).copied().flatten(),
            temperature_c: self.temperature.get(index).copied().flatten(),
        }
    }

    /// Wind speed at `index`, falling back to [`DEFAULT_WIND_SPEED_KMH`]
    #[must_use]
    pub fn wind_speed_at(&self, index: usize) -> f64 {
        self.sample(index)
            .wind_speed_kmh
            .unwrap_or(DEFAULT_WIND_SPEED_KMH)
    }

    /// Wind direction at `index`, falling back to [`DEFAULT_WIND_DIRECTION_DEG`]
    #[must_use]
    pub fn wind_direction_at(&self, index: usize) -> f64 {
        self.sample(index)
            .wind_direction_deg
            .unwrap_or(DEFAULT_WIND_DIRECTION_DEG)
    }
}
