//! Weather lookup for resolved coordinates
//!
//! Fetches current temperature and precipitation probability through a
//! weather provider. A missing temperature becomes the `N/A` sentinel so
//! "no reading" stays distinguishable from an actual 0°C measurement;
//! provider failures map to absence, never to caller-visible errors.

use crate::Result;
use crate::config::WeatherConfig;
use crate::error::TripScoutError;
use crate::models::{Temperature, WeatherReading};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const USER_AGENT: &str = "TripScout/0.1.0";

/// Raw current-conditions observation as returned by the provider
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherObservation {
    pub temperature_c: Option<f64>,
    pub precipitation_chance: Option<f64>,
    /// Observation timestamp in the provider's `%Y-%m-%dT%H:%M` format
    pub observed_at: Option<String>,
}

/// Weather service seam. Implementations map transport failures,
/// non-2xx statuses and malformed payloads to `Api` errors.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current(&self, latitude: f64, longitude: f64) -> Result<WeatherObservation>;
}

/// Fetches current weather, absorbing upstream failures into absence
pub struct WeatherService {
    provider: Arc<dyn WeatherProvider>,
}

impl WeatherService {
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self { provider }
    }

    /// Get the current reading for coordinates, or `None` when the
    /// provider failed. Readings are built fresh per request.
    pub async fn current_weather(&self, latitude: f64, longitude: f64) -> Option<WeatherReading> {
        match self.provider.current(latitude, longitude).await {
            Ok(observation) => {
                let reading = reading_from(observation);
                if let Some(observed_at) = reading.observed_at {
                    debug!("Weather observation from {}", observed_at);
                }
                Some(reading)
            }
            Err(e) => {
                warn!(
                    "Weather lookup failed for {:.4}, {:.4}: {}",
                    latitude, longitude, e
                );
                None
            }
        }
    }
}

fn reading_from(observation: WeatherObservation) -> WeatherReading {
    let temperature = match observation.temperature_c {
        Some(value) => Temperature::Celsius(value),
        None => Temperature::Unavailable,
    };

    // Missing or unusable precipitation defaults to 0, not absence
    let precipitation_chance = observation
        .precipitation_chance
        .map_or(0, |chance| chance as i64);

    WeatherReading {
        temperature,
        precipitation_chance,
        observed_at: observation
            .observed_at
            .as_deref()
            .and_then(parse_observation_time),
    }
}

fn parse_observation_time(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .ok()
        .map(|dt| dt.and_utc())
}

/// Format a reading into the user-facing weather sentence
#[must_use]
pub fn format_weather_response(place_name: &str, reading: &WeatherReading) -> String {
    format!(
        "In {} it's currently {}°C with a chance of {}% to rain.",
        place_name, reading.temperature, reading.precipitation_chance
    )
}

/// `OpenMeteo` forecast API client
pub struct OpenMeteoClient {
    client: Client,
    base_url: String,
}

impl OpenMeteoClient {
    /// Create a new client
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| TripScoutError::api(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoClient {
    async fn current(&self, latitude: f64, longitude: f64) -> Result<WeatherObservation> {
        let url = format!(
            "{}/forecast?latitude={}&longitude={}&current=temperature_2m,precipitation_probability&forecast_days=1",
            self.base_url, latitude, longitude
        );

        debug!("Weather request URL: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| TripScoutError::api(format!("Weather request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(TripScoutError::api(format!(
                "Weather service returned status {}",
                response.status()
            )));
        }

        let forecast: open_meteo::ForecastResponse = response
            .json()
            .await
            .map_err(|e| TripScoutError::api(format!("Failed to parse weather response: {e}")))?;

        let current = forecast
            .current
            .ok_or_else(|| TripScoutError::api("No current weather data in response"))?;

        Ok(WeatherObservation {
            temperature_c: current.temperature,
            precipitation_chance: current.precipitation_probability,
            observed_at: current.time,
        })
    }
}

/// `OpenMeteo` API response structures
mod open_meteo {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct ForecastResponse {
        pub current: Option<CurrentData>,
    }

    #[derive(Debug, Deserialize)]
    pub struct CurrentData {
        pub time: Option<String>,
        #[serde(rename = "temperature_2m")]
        pub temperature: Option<f64>,
        pub precipitation_probability: Option<f64>,
    }
}
