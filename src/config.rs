//! Configuration management for `windroute`
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::WindRouteError;
use crate::track::{DEFAULT_MAX_POINTS, DEFAULT_MIN_DISTANCE_KM};
use anyhow::{Context, Result};
use chrono::Duration;
use chrono_tz::Tz;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WindRouteConfig {
    /// Forecast API configuration
    #[serde(default)]
    pub weather: WeatherConfig,
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Route analysis tuning
    #[serde(default)]
    pub analysis: AnalysisConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Forecast API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Base URL for the Open-Meteo API
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_weather_timeout")]
    pub timeout_seconds: u32,
    /// IANA timezone for forecast timestamps and ride times
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// User agent sent with forecast requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Maximum GPX upload size in MB
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: u32,
    /// Directory of a web frontend served next to the API
    #[serde(default)]
    pub static_dir: Option<String>,
}

/// Route analysis settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Points kept by the simplifier
    #[serde(default = "default_max_points")]
    pub max_points: usize,
    /// Minimum spacing between kept points in km
    #[serde(default = "default_min_distance_km")]
    pub min_distance_km: f64,
    /// Rider speed used by the CLI when none is given, km/h
    #[serde(default = "default_rider_speed")]
    pub default_rider_speed: f64,
    /// How far in the past a ride may start
    #[serde(default = "default_days_before")]
    pub days_before: u32,
    /// How far in the future a ride may start
    #[serde(default = "default_days_after")]
    pub days_after: u32,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_weather_base_url() -> String {
    "https://api.open-meteo.com/v1".to_string()
}

fn default_weather_timeout() -> u32 {
    15
}

fn default_timezone() -> String {
    "Europe/Paris".to_string()
}

fn default_user_agent() -> String {
    format!("windroute/{}", crate::VERSION)
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_upload_mb() -> u32 {
    50
}

fn default_max_points() -> usize {
    DEFAULT_MAX_POINTS
}

fn default_min_distance_km() -> f64 {
    DEFAULT_MIN_DISTANCE_KM
}

fn default_rider_speed() -> f64 {
    20.0
}

fn default_days_before() -> u32 {
    1
}

fn default_days_after() -> u32 {
    7
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: default_weather_base_url(),
            timeout_seconds: default_weather_timeout(),
            timezone: default_timezone(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_mb: default_max_upload_mb(),
            static_dir: None,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_points: default_max_points(),
            min_distance_km: default_min_distance_km(),
            default_rider_speed: default_rider_speed(),
            days_before: default_days_before(),
            days_after: default_days_after(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl WeatherConfig {
    /// Configured timezone, parsed
    pub fn tz(&self) -> crate::Result<Tz> {
        self.timezone.parse::<Tz>().map_err(|_| {
            WindRouteError::config(format!("Unknown timezone '{}'", self.timezone))
        })
    }
}

impl AnalysisConfig {
    /// Accepted ride-start window relative to now, as (before, after)
    #[must_use]
    pub fn date_window(&self) -> (Duration, Duration) {
        (
            Duration::days(i64::from(self.days_before)),
            Duration::days(i64::from(self.days_after)),
        )
    }
}

impl ServerConfig {
    /// Upload body limit in bytes
    #[must_use]
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb as usize * 1024 * 1024
    }
}

impl WindRouteConfig {
    /// Load configuration from `config_path`, or the default location when
    /// `None`, layered under `WINDROUTE_*` environment variables
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // WINDROUTE_SERVER__PORT=9000 style overrides
        builder = builder.add_source(
            Environment::with_prefix("WINDROUTE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: WindRouteConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("windroute").join("config.toml"))
    }

    /// Apply default values to empty or zeroed fields
    pub fn apply_defaults(&mut self) {
        if self.weather.base_url.is_empty() {
            self.weather.base_url = default_weather_base_url();
        }
        if self.weather.timeout_seconds == 0 {
            self.weather.timeout_seconds = default_weather_timeout();
        }
        if self.weather.timezone.is_empty() {
            self.weather.timezone = default_timezone();
        }
        if self.weather.user_agent.is_empty() {
            self.weather.user_agent = default_user_agent();
        }
        if self.server.host.is_empty() {
            self.server.host = default_host();
        }
        if self.server.max_upload_mb == 0 {
            self.server.max_upload_mb = default_max_upload_mb();
        }
        if self.analysis.max_points == 0 {
            self.analysis.max_points = default_max_points();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.weather.timeout_seconds > 300 {
            return Err(
                WindRouteError::config("Weather API timeout cannot exceed 300 seconds").into(),
            );
        }

        if self.server.max_upload_mb > 500 {
            return Err(WindRouteError::config("Upload limit cannot exceed 500 MB").into());
        }

        if self.analysis.max_points < 2 {
            return Err(WindRouteError::config("max_points must be at least 2").into());
        }

        if !self.analysis.min_distance_km.is_finite() || self.analysis.min_distance_km < 0.0 {
            return Err(
                WindRouteError::config("min_distance_km must be a non-negative number").into(),
            );
        }

        let speed = self.analysis.default_rider_speed;
        if !speed.is_finite() || speed <= 0.0 || speed > 100.0 {
            return Err(WindRouteError::config(
                "default_rider_speed must be between 0 and 100 km/h",
            )
            .into());
        }

        if self.analysis.days_after > 16 {
            return Err(WindRouteError::config(
                "days_after cannot exceed 16 days (forecast horizon)",
            )
            .into());
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(WindRouteError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(WindRouteError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if !self.weather.base_url.starts_with("http://")
            && !self.weather.base_url.starts_with("https://")
        {
            return Err(WindRouteError::config(
                "Weather API base URL must be a valid HTTP or HTTPS URL",
            )
            .into());
        }

        self.weather.tz()?;

        Ok(())
    }
}
