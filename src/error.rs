use std::io;
use thiserror::Error;

/// Custom error types for the as-sawm application
#[derive(Error, Debug)]
pub enum AppError {
    /// Error when a command is missing one of its arguments
    #[error("Missing parameter: {0}")]
    MissingParameter(String),

    /// Error when the command loop receives something it does not know
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// Error when the timings API request fails or answers with a failure status
    #[error("API request failed: {0}")]
    ApiRequestFailed(String),

    /// Error when the position of the device cannot be determined
    #[error("Geolocation failed: {0}")]
    Geolocation(#[from] GeolocationError),

    /// Error when a time-of-day string is not in `HH:MM` form
    #[error("Invalid time of day: {0:?}")]
    TimeParse(String),

    /// Error when an environment variable holds a value we cannot use
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Wrapper for reqwest errors
    #[error("HTTP request error: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Wrapper for I/O errors
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// Wrapper for JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Reasons a one-shot position request can fail.
///
/// The `Display` text is what the user sees.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeolocationError {
    #[error("Location access was denied. Allow location access and try again.")]
    PermissionDenied,

    #[error("Location information is unavailable.")]
    PositionUnavailable,

    #[error("The request to get your location timed out.")]
    Timeout,
}
