//! Error types and handling for the `CareFinder` discovery core

use thiserror::Error;

/// Main error type for the `CareFinder` library
#[derive(Error, Debug)]
pub enum CareFinderError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Network/transport errors talking to the geocoding or map-data services
    #[error("Network error: {message}")]
    Network { message: String },

    /// Malformed or unexpected response payloads
    #[error("Parse error: {message}")]
    Parse { message: String },

    /// Non-success responses from an upstream service
    #[error("API error: {message}")]
    Api { message: String },

    /// Geolocation denied or unavailable in the host environment
    #[error("Geolocation error: {message}")]
    Geolocation { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },
}

impl CareFinderError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new network error
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create a new parse error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a new geolocation error
    pub fn geolocation<S: Into<String>>(message: S) -> Self {
        Self::Geolocation {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message suitable for the notice surface
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            CareFinderError::Config { .. } => {
                "Configuration error. Please check the search settings.".to_string()
            }
            CareFinderError::Network { .. } => {
                "Unable to reach the map services. Please check your internet connection and try again."
                    .to_string()
            }
            CareFinderError::Parse { .. } | CareFinderError::Api { .. } => {
                "The map service returned an unexpected response. Please try again.".to_string()
            }
            CareFinderError::Geolocation { message } => {
                format!("Could not determine your location: {message}")
            }
            CareFinderError::Validation { message } => {
                format!("Invalid input: {message}")
            }
        }
    }
}
