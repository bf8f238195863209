//! Device location.
//!
//! A terminal has no geolocation prompt, so "where am I" is answered by the
//! configured fixed coordinates or an IP geolocation lookup. Either way the
//! caller gets one async result with a typed failure.

use std::time::{Duration, Instant};

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use skycast_core::LocationConfig;
use tokio::sync::Mutex;

use crate::types::{Location, LocationError};

const USER_AGENT: &str = concat!("skycast/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
    #[serde(default)]
    city: Option<String>,
}

/// IP geolocation lookup with a bounded wait and a reusable last fix.
#[derive(Debug)]
pub struct IpLocator {
    client: Client,
    lookup_url: String,
    timeout: Duration,
    maximum_age: Duration,
    last_fix: Mutex<Option<(Instant, Location)>>,
}

impl IpLocator {
    pub fn new(config: &LocationConfig) -> Result<Self, LocationError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| LocationError::Other(e.to_string()))?;

        Ok(Self {
            client,
            lookup_url: config.lookup_url.clone(),
            timeout,
            maximum_age: Duration::from_secs(config.maximum_age_secs),
            last_fix: Mutex::new(None),
        })
    }

    /// Current location, reusing a fix younger than the configured maximum age
    pub async fn locate(&self) -> Result<Location, LocationError> {
        let mut last_fix = self.last_fix.lock().await;

        if let Some((at, location)) = last_fix.as_ref() {
            if at.elapsed() <= self.maximum_age {
                tracing::debug!("Reusing location fix from {:?} ago", at.elapsed());
                return Ok(location.clone());
            }
        }

        let location = tokio::time::timeout(self.timeout, self.lookup())
            .await
            .map_err(|_| LocationError::Timeout)??;

        tracing::info!(
            "Got location: {}, {}",
            location.latitude,
            location.longitude
        );
        *last_fix = Some((Instant::now(), location.clone()));
        Ok(location)
    }

    async fn lookup(&self) -> Result<Location, LocationError> {
        let response = self
            .client
            .get(&self.lookup_url)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LocationError::Timeout
                } else {
                    tracing::debug!("Location lookup request failed: {}", e);
                    LocationError::ServiceUnavailable
                }
            })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(LocationError::PermissionDenied);
        }
        if !status.is_success() {
            tracing::debug!("Location lookup returned status {}", status);
            return Err(LocationError::ServiceUnavailable);
        }

        let body: IpApiResponse = response
            .json()
            .await
            .map_err(|e| LocationError::Other(format!("Invalid location response: {}", e)))?;

        if body.status != "success" {
            tracing::debug!(
                "Location lookup failed: {}",
                body.message.as_deref().unwrap_or("no reason given")
            );
            return Err(LocationError::ServiceUnavailable);
        }

        match (body.lat, body.lon) {
            (Some(latitude), Some(longitude)) => Ok(Location {
                latitude,
                longitude,
                city_name: body.city.filter(|c| !c.is_empty()),
            }),
            _ => Err(LocationError::Other(
                "Location response has no coordinates".to_string(),
            )),
        }
    }
}

/// Resolve the device location.
///
/// Disabled lookups behave like a denied permission prompt. Fixed coordinates
/// from config win over the IP lookup.
pub async fn get_current_location(
    config: &LocationConfig,
    locator: &IpLocator,
) -> Result<Location, LocationError> {
    if !config.enabled {
        return Err(LocationError::PermissionDenied);
    }

    if let Some((latitude, longitude)) = config.fixed_coordinates() {
        return Ok(Location::new(latitude, longitude));
    }

    locator.locate().await
}
