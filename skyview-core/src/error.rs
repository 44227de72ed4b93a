use thiserror::Error;

/// Why a location could not be resolved automatically.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,
    #[error("location request timed out")]
    Timeout,
    #[error("location service is not supported here")]
    Unsupported,
    #[error("location service unavailable: {0}")]
    Unavailable(String),
    #[error("location lookup failed: {0}")]
    Other(String),
}

/// Errors produced while fetching weather data.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// Input rejected before any request was sent.
    #[error("invalid location: {0}")]
    InvalidLocation(String),

    /// The request never produced an HTTP response (offline, DNS, refused, timeout).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("weather API returned status {status}: {message}")]
    Remote { status: u16, code: Option<i64>, message: String },

    /// The API answered 2xx but the payload did not have the expected shape.
    #[error("unexpected weather API payload: {0}")]
    Malformed(String),

    #[error(transparent)]
    Location(#[from] LocationError),
}

impl WeatherError {
    pub fn is_network(&self) -> bool {
        matches!(self, WeatherError::Network(_))
    }
}
