//! OpenWeatherMap client.
//!
//! Every lookup fans out to `/weather` and `/forecast` concurrently and fails
//! as a whole if either request fails.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use skycast_core::{Units, WeatherConfig};
use tracing::instrument;

use crate::forecast::select_forecast_days_now;
use crate::types::{
    CurrentConditions, ForecastResponse, Location, WeatherError, WeatherReport,
};

#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Arc<Client>,
    base_url: String,
    api_key: String,
}

impl WeatherProvider {
    /// Build a provider from config. Fails without a usable API key.
    pub fn new(config: &WeatherConfig) -> Result<Self, WeatherError> {
        if !config.is_configured() {
            return Err(WeatherError::ApiKeyMissing);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.trim().to_string(),
        })
    }

    /// Current conditions and forecast for a city name
    #[instrument(skip(self), level = "info")]
    pub async fn fetch_by_city(&self, city: &str, units: Units) -> Result<WeatherReport, WeatherError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(WeatherError::EmptyQuery);
        }

        self.fetch_pair(&[("q", city.to_string())], city, units).await
    }

    /// Current conditions and forecast for a coordinate pair
    #[instrument(skip(self), level = "info")]
    pub async fn fetch_by_coords(
        &self,
        latitude: f64,
        longitude: f64,
        units: Units,
    ) -> Result<WeatherReport, WeatherError> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(WeatherError::InvalidCoordinates {
                latitude,
                longitude,
            });
        }

        let label = format!("{}, {}", latitude, longitude);
        self.fetch_pair(
            &[("lat", latitude.to_string()), ("lon", longitude.to_string())],
            &label,
            units,
        )
        .await
    }

    /// Weather at a resolved location
    pub async fn fetch(&self, location: &Location, units: Units) -> Result<WeatherReport, WeatherError> {
        self.fetch_by_coords(location.latitude, location.longitude, units)
            .await
    }

    async fn fetch_pair(
        &self,
        query: &[(&'static str, String)],
        label: &str,
        units: Units,
    ) -> Result<WeatherReport, WeatherError> {
        let (current, forecast) = tokio::try_join!(
            self.get_json::<CurrentConditions>("weather", query, label, units),
            self.get_json::<ForecastResponse>("forecast", query, label, units),
        )?;

        let days = select_forecast_days_now(&forecast.list);
        tracing::info!(
            "Fetched weather for {} ({} forecast entries, {} days selected)",
            label,
            forecast.list.len(),
            days.len()
        );

        Ok(WeatherReport {
            current,
            forecast: days,
            units,
            fetched_at: Utc::now(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&'static str, String)],
        label: &str,
        units: Units,
    ) -> Result<T, WeatherError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        tracing::debug!(url = %url, ?query, units = %units, "Requesting weather data");

        let response = self
            .client
            .get(&url)
            .query(query)
            .query(&[("appid", self.api_key.as_str()), ("units", units.as_query())])
            .send()
            .await?;

        Self::handle_response(response, label).await
    }

    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
        label: &str,
    ) -> Result<T, WeatherError> {
        let status = response.status();

        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| WeatherError::Parse(e.to_string()));
        }

        match status {
            StatusCode::UNAUTHORIZED => Err(WeatherError::InvalidApiKey),
            StatusCode::NOT_FOUND => Err(WeatherError::CityNotFound(label.to_string())),
            StatusCode::TOO_MANY_REQUESTS => Err(WeatherError::RateLimited),
            s if s.is_server_error() => Err(WeatherError::ServiceUnavailable(format!("HTTP {}", s))),
            s => {
                let message = response.text().await.unwrap_or_default();
                Err(WeatherError::Api {
                    status: s.as_u16(),
                    message,
                })
            }
        }
    }
}
