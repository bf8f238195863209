//! Centralized error types for Skycast.
//!
//! This module provides a typed error hierarchy that:
//! - Enables precise error handling at the CLI boundary
//! - Provides user-friendly messages suitable for terminal display
//! - Preserves full error context for debugging/logging

use thiserror::Error;

/// Fallback message shown when a lookup fails for a reason we can't classify.
pub const GENERIC_FAILURE: &str =
    "Could not fetch weather. Check city name, permissions, or API key limits.";

/// Top-level application error type.
///
/// Errors from the weather crate convert into this type. Use `user_message()`
/// to get a message fit for the terminal.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Weather service error: {0}")]
    Weather(#[from] WeatherError),

    #[error("Location error: {0}")]
    Location(#[from] LocationFailure),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Returns a user-friendly message suitable for display.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Network(e) => e.user_message(),
            AppError::Config(e) => e.user_message(),
            AppError::Weather(e) => e.user_message(),
            AppError::Location(e) => e.user_message(),
            AppError::Io(_) => "A file operation failed. Please try again.",
            AppError::Other(_) => GENERIC_FAILURE,
        }
    }
}

/// Network-related errors (HTTP, connectivity).
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,
}

impl NetworkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed(_) => {
                "Unable to connect. Check your internet connection."
            }
            NetworkError::Timeout => "The request timed out. Please try again.",
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),
}

impl ConfigError {
    /// Classify a failure from `Config::load_validated`
    pub fn from_load_error(e: &anyhow::Error) -> Self {
        let detail = format!("{:#}", e);
        if e.downcast_ref::<toml::de::Error>().is_some() {
            ConfigError::ParseError(detail)
        } else {
            ConfigError::Invalid(detail)
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::ParseError(_) => "Configuration file is malformed. Check your settings.",
        }
    }
}

/// Weather lookup errors, as seen by the user.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("City not found: {0}")]
    CityNotFound(String),

    #[error("Weather API error: {0}")]
    ApiError(String),

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("API key not configured")]
    ApiKeyMissing,

    #[error("Rate limited")]
    RateLimited,

    #[error("Service unavailable")]
    ServiceUnavailable,

    #[error("Empty search query")]
    EmptyQuery,

    #[error("Coordinates out of range")]
    InvalidCoordinates,
}

impl WeatherError {
    pub fn user_message(&self) -> &'static str {
        match self {
            WeatherError::CityNotFound(_) => "City not found. Check the name and try again.",
            WeatherError::ApiError(_) => GENERIC_FAILURE,
            WeatherError::InvalidApiKey => "Weather API key is invalid. Check settings.",
            WeatherError::ApiKeyMissing => {
                "Add your OpenWeatherMap API key to the configuration."
            }
            WeatherError::RateLimited => "Weather API limit reached. Please wait and try again.",
            WeatherError::ServiceUnavailable => {
                "Weather service unavailable. Please try again later."
            }
            WeatherError::EmptyQuery => "Type a city name to search.",
            WeatherError::InvalidCoordinates => {
                "Coordinates are out of range (latitude -90..90, longitude -180..180)."
            }
        }
    }
}

/// Device location failures, as seen by the user.
#[derive(Debug, Error)]
pub enum LocationFailure {
    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Location unavailable")]
    Unavailable,

    #[error("Location request timed out")]
    Timeout,

    #[error("Location lookup failed: {0}")]
    Other(String),
}

impl LocationFailure {
    pub fn user_message(&self) -> &'static str {
        match self {
            LocationFailure::PermissionDenied => "Location permission denied or unavailable.",
            LocationFailure::Unavailable => {
                "Location unavailable on this device. Try searching by city name."
            }
            LocationFailure::Timeout => "Location request timed out. Please try again.",
            LocationFailure::Other(_) => "Location permission denied or unavailable.",
        }
    }
}

/// Extension trait for converting transport-level reqwest errors.
///
/// HTTP statuses and body decoding are classified by the callers; only
/// failures from `send()` end up here.
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        if self.is_timeout() {
            NetworkError::Timeout
        } else {
            NetworkError::ConnectionFailed(self.to_string())
        }
    }
}
