use thiserror::Error;

/// Everything that can go wrong between a city name and a rendered dashboard.
///
/// Each variant carries a human-readable message; the CLI prints it as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WeatherError {
    /// The geocoding API answered, but had no match for the input.
    #[error("Could not find city: '{0}'. Please check the spelling.")]
    NotFound(String),

    /// Transport or HTTP failure while geocoding. Never retried.
    #[error("Geocoding API error: {0}")]
    Geocoding(String),

    /// Forecast transport failure after all retries were spent.
    #[error("Forecast API error: {0}")]
    Fetch(String),

    /// The forecast response did not match the request it answers.
    #[error("Malformed forecast response: {0}")]
    Projection(String),
}

impl WeatherError {
    pub fn projection(msg: impl Into<String>) -> Self {
        WeatherError::Projection(msg.into())
    }
}

pub type Result<T, E = WeatherError> = std::result::Result<T, E>;
