use chrono::{DateTime, NaiveDate, Timelike, Utc};
use serde::{Deserialize, Serialize};
use skycast_core::error::ReqwestErrorExt;
use skycast_core::{AppError, LocationFailure, Units};

/// Condition descriptor as reported by OpenWeatherMap (`weather[0]`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Icon code, e.g. "10d"
    #[serde(default)]
    pub icon: String,
    /// Short label, e.g. "Rain"
    #[serde(default)]
    pub main: String,
    /// Free text, e.g. "light rain"
    #[serde(default)]
    pub description: String,
}

/// High/low pair of a forecast entry (`main` in the API payload)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleTemperatures {
    pub temp_max: f64,
    pub temp_min: f64,
}

/// One entry of the 3-hourly forecast feed.
///
/// Kept in the upstream shape so a selected entry can be rendered or
/// re-serialized as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSample {
    /// Unix timestamp, seconds, UTC
    pub dt: i64,
    pub main: SampleTemperatures,
    #[serde(default)]
    pub weather: Vec<Condition>,
}

impl ForecastSample {
    /// `None` only for timestamps chrono can't represent
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.dt, 0)
    }

    /// UTC calendar date, the day-grouping key
    pub fn utc_date(&self) -> Option<NaiveDate> {
        self.timestamp().map(|t| t.date_naive())
    }

    pub fn utc_hour(&self) -> Option<u32> {
        self.timestamp().map(|t| t.hour())
    }

    pub fn condition(&self) -> Option<&Condition> {
        self.weather.first()
    }
}

/// `/forecast` response body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForecastResponse {
    #[serde(default)]
    pub list: Vec<ForecastSample>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemInfo {
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurrentMain {
    pub temp: f64,
    pub feels_like: f64,
    pub humidity: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    pub speed: f64,
}

/// Current weather conditions (`/weather` response body)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sys: Option<SystemInfo>,
    #[serde(default)]
    pub weather: Vec<Condition>,
    pub main: CurrentMain,
    pub wind: Wind,
}

impl CurrentConditions {
    pub fn condition(&self) -> Option<&Condition> {
        self.weather.first()
    }

    pub fn country(&self) -> Option<&str> {
        self.sys
            .as_ref()
            .and_then(|s| s.country.as_deref())
            .filter(|c| !c.is_empty())
    }
}

/// Geographic location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub city_name: Option<String>,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            city_name: None,
        }
    }
}

/// Complete result of one lookup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherReport {
    pub current: CurrentConditions,
    /// Up to three upcoming days, one representative entry each
    pub forecast: Vec<ForecastSample>,
    /// Unit system the values were requested in
    pub units: Units,
    pub fetched_at: DateTime<Utc>,
}

/// Location service errors
#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location service unavailable")]
    ServiceUnavailable,
    #[error("Location request timed out")]
    Timeout,
    #[error("Location error: {0}")]
    Other(String),
}

/// Weather provider errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Location error: {0}")]
    Location(#[from] LocationError),
    #[error("API key not configured")]
    ApiKeyMissing,
    #[error("Invalid API key")]
    InvalidApiKey,
    #[error("City not found: {0}")]
    CityNotFound(String),
    #[error("Rate limited by weather API")]
    RateLimited,
    #[error("Weather service unavailable: {0}")]
    ServiceUnavailable(String),
    #[error("Weather API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Empty search query")]
    EmptyQuery,
    #[error("Invalid coordinates: {latitude}, {longitude}")]
    InvalidCoordinates { latitude: f64, longitude: f64 },
}

impl From<LocationError> for LocationFailure {
    fn from(e: LocationError) -> Self {
        match e {
            LocationError::PermissionDenied => LocationFailure::PermissionDenied,
            LocationError::ServiceUnavailable => LocationFailure::Unavailable,
            LocationError::Timeout => LocationFailure::Timeout,
            LocationError::Other(s) => LocationFailure::Other(s),
        }
    }
}

impl From<LocationError> for AppError {
    fn from(e: LocationError) -> Self {
        AppError::Location(e.into())
    }
}

impl From<WeatherError> for AppError {
    fn from(e: WeatherError) -> Self {
        use skycast_core::WeatherError as Core;

        match e {
            WeatherError::Network(e) => AppError::Network(e.into_network_error()),
            WeatherError::Location(e) => e.into(),
            WeatherError::ApiKeyMissing => AppError::Weather(Core::ApiKeyMissing),
            WeatherError::InvalidApiKey => AppError::Weather(Core::InvalidApiKey),
            WeatherError::CityNotFound(city) => AppError::Weather(Core::CityNotFound(city)),
            WeatherError::RateLimited => AppError::Weather(Core::RateLimited),
            WeatherError::ServiceUnavailable(_) => AppError::Weather(Core::ServiceUnavailable),
            WeatherError::Api { status, message } => {
                AppError::Weather(Core::ApiError(format!("{}: {}", status, message)))
            }
            WeatherError::Parse(s) => AppError::Weather(Core::ApiError(s)),
            WeatherError::EmptyQuery => AppError::Weather(Core::EmptyQuery),
            WeatherError::InvalidCoordinates { .. } => AppError::Weather(Core::InvalidCoordinates),
        }
    }
}
