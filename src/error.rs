//! Error types and handling for the `WindRoute` application

use thiserror::Error;

/// Main error type for the `WindRoute` application
#[derive(Error, Debug)]
pub enum WindRouteError {
    /// The track decodes to fewer than two usable points
    #[error("Insufficient data: {message}")]
    InsufficientData { message: String },

    /// Missing or malformed request fields
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// Ride time outside the accepted forecast window
    #[error("Date out of range: {message}")]
    OutOfRangeDateTime { message: String },

    /// Forecast service failures (timeout, HTTP status, bad payload)
    #[error("External service error: {message}")]
    ExternalService { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl WindRouteError {
    /// Create a new insufficient data error
    pub fn insufficient_data<S: Into<String>>(message: S) -> Self {
        Self::InsufficientData {
            message: message.into(),
        }
    }

    /// Create a new invalid input error
    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create a new out-of-range date error
    pub fn out_of_range<S: Into<String>>(message: S) -> Self {
        Self::OutOfRangeDateTime {
            message: message.into(),
        }
    }

    /// Create a new external service error
    pub fn external<S: Into<String>>(message: S) -> Self {
        Self::ExternalService {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            WindRouteError::InsufficientData { message } => {
                format!("The route has no usable track data: {message}")
            }
            WindRouteError::InvalidInput { message } => format!("Invalid input: {message}"),
            WindRouteError::OutOfRangeDateTime { message } => {
                format!("Ride date outside the forecast window: {message}")
            }
            WindRouteError::ExternalService { .. } => {
                "Unable to fetch the wind forecast. Please try again later.".to_string()
            }
            WindRouteError::Config { .. } => {
                "Configuration error. Please check your config file.".to_string()
            }
            WindRouteError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = WindRouteError::insufficient_data("1 point");
        assert!(matches!(err, WindRouteError::InsufficientData { .. }));

        let err = WindRouteError::invalid_input("rider_speed must be positive");
        assert!(matches!(err, WindRouteError::InvalidInput { .. }));

        let err = WindRouteError::out_of_range("2020-01-01T10:00");
        assert!(matches!(err, WindRouteError::OutOfRangeDateTime { .. }));

        let err = WindRouteError::external("HTTP 503");
        assert!(matches!(err, WindRouteError::ExternalService { .. }));
    }

    #[test]
    fn test_user_messages() {
        let err = WindRouteError::invalid_input("bad datetime");
        assert!(err.user_message().contains("bad datetime"));

        let err = WindRouteError::external("connection reset");
        assert!(err.user_message().contains("wind forecast"));
        assert!(!err.user_message().contains("connection reset"));

        let err = WindRouteError::out_of_range("too late");
        assert!(err.user_message().contains("too late"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: WindRouteError = io_err.into();
        assert!(matches!(err, WindRouteError::Io { .. }));
    }
}
