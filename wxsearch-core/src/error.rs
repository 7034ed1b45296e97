use thiserror::Error;

/// Failure modes of a weather lookup.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LookupError {
    /// Input rejected before any network call.
    #[error("invalid search: {0}")]
    Validation(String),

    /// Geocoding returned zero matches.
    #[error("no location found for '{0}'")]
    NotFound(String),

    /// Transport failure, non-success status or unparseable body.
    #[error("network error: {0}")]
    Network(String),
}

impl LookupError {
    /// Short message suitable for showing next to the search box.
    pub fn user_message(&self) -> &'static str {
        match self {
            LookupError::Validation(_) => "Please enter a city name",
            LookupError::NotFound(_) => "City not found. Please try another city name.",
            LookupError::Network(_) => "Failed to fetch weather data. Please try again.",
        }
    }
}

impl From<reqwest::Error> for LookupError {
    fn from(err: reqwest::Error) -> Self {
        LookupError::Network(err.to_string())
    }
}
