//! Error types and handling for the `WeatherSense` dashboard

use thiserror::Error;

/// Reasons a device position lookup can fail
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeolocationError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("position unavailable")]
    PositionUnavailable,

    #[error("position request timed out")]
    Timeout,

    #[error("geolocation is not supported")]
    Unsupported,

    /// Too many lookups inside the rate limit window
    #[error("rate limit exceeded, retry in {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },
}

impl GeolocationError {
    /// Get a user-friendly message for the failure kind
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            GeolocationError::PermissionDenied => {
                "Unable to get your location. Please enable location permissions in your settings."
                    .to_string()
            }
            GeolocationError::PositionUnavailable => {
                "Unable to get your location. Location information is unavailable.".to_string()
            }
            GeolocationError::Timeout => {
                "Unable to get your location. Location request timed out.".to_string()
            }
            GeolocationError::Unsupported => {
                "Geolocation is not supported on this device".to_string()
            }
            GeolocationError::RateLimited { retry_after_secs } => format!(
                "Rate limit exceeded. Please wait {retry_after_secs} seconds before trying again."
            ),
        }
    }
}

/// Main error type for the `WeatherSense` dashboard
#[derive(Error, Debug)]
pub enum WeatherSenseError {
    /// A required upstream request failed
    #[error("Network error: {message}")]
    Network {
        message: String,
        status: Option<u16>,
        #[source]
        source: Option<reqwest::Error>,
    },

    /// Geocoding returned no match for the query
    #[error("No location found for '{query}'")]
    GeocodingNotFound { query: String },

    #[error("Geolocation error: {0}")]
    Geolocation(#[from] GeolocationError),

    /// An optional source failed; absorbed by the fetch layer
    #[error("Optional source '{name}' unavailable: {message}")]
    OptionalSourceUnavailable { name: String, message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Preference store errors
    #[error("Storage error: {message}")]
    Storage { message: String },

    /// A rendering capability failed
    #[error("Render error: {message}")]
    Render { message: String },

    /// Critical display fields are missing
    #[error("Initialization failed, missing critical fields: {}", missing.join(", "))]
    Initialization { missing: Vec<String> },
}

impl WeatherSenseError {
    /// Create a new network error without an underlying transport cause
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
            status: None,
            source: None,
        }
    }

    /// Create a network error for a non-success HTTP status
    pub fn http_status<S: Into<String>>(status: u16, message: S) -> Self {
        Self::Network {
            message: message.into(),
            status: Some(status),
            source: None,
        }
    }

    /// Wrap a transport error with context
    pub fn transport<S: Into<String>>(context: S, source: reqwest::Error) -> Self {
        Self::Network {
            message: format!("{}: {source}", context.into()),
            status: source.status().map(|s| s.as_u16()),
            source: Some(source),
        }
    }

    pub fn geocoding_not_found<S: Into<String>>(query: S) -> Self {
        Self::GeocodingNotFound {
            query: query.into(),
        }
    }

    pub fn optional_source<N: Into<String>, S: Into<String>>(name: N, message: S) -> Self {
        Self::OptionalSourceUnavailable {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new storage error
    pub fn storage<S: Into<String>>(message: S) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn render<S: Into<String>>(message: S) -> Self {
        Self::Render {
            message: message.into(),
        }
    }

    /// Coerce any failure of a required source into a network error, keeping the cause text
    #[must_use]
    pub fn into_network(self) -> Self {
        match self {
            network @ WeatherSenseError::Network { .. } => network,
            other => WeatherSenseError::network(other.to_string()),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            WeatherSenseError::Network { message, .. } => {
                format!("Failed to fetch weather data: {message}")
            }
            WeatherSenseError::GeocodingNotFound { .. } => {
                "Location not found. Please check the spelling and try again.".to_string()
            }
            WeatherSenseError::Geolocation(err) => err.user_message(),
            WeatherSenseError::OptionalSourceUnavailable { message, .. } => message.clone(),
            WeatherSenseError::Config { .. } => {
                "Configuration error. Please check your config file and API key.".to_string()
            }
            WeatherSenseError::Validation { message } => message.clone(),
            WeatherSenseError::Storage { .. } => {
                "Saving preferences failed. Your settings may not persist.".to_string()
            }
            WeatherSenseError::Render { message } => format!("Display update failed: {message}"),
            WeatherSenseError::Initialization { .. } => {
                "App initialization failed. Please check the logs for details.".to_string()
            }
        }
    }
}

impl From<fjall::Error> for WeatherSenseError {
    fn from(err: fjall::Error) -> Self {
        Self::storage(err.to_string())
    }
}

impl From<postcard::Error> for WeatherSenseError {
    fn from(err: postcard::Error) -> Self {
        Self::storage(format!("encoding failed: {err}"))
    }
}
