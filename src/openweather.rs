//! OpenWeatherMap current-weather provider.

use std::time::Duration;

use async_trait::async_trait;
use guess_weather_core::{City, FetchError, FetchErrorKind, WeatherProvider, WeatherReading};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use crate::config::ProviderConfig;

/// Subset of the current-weather payload the game needs.
#[derive(Debug, Deserialize)]
struct CurrentWeather {
    name: String,
    main: MainBlock,
}

#[derive(Debug, Deserialize)]
struct MainBlock {
    temp: f64,
}

/// Error body returned with non-success statuses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// HTTP client for the OpenWeatherMap current-weather endpoint.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    units: String,
}

impl OpenWeatherClient {
    /// Creates a client from provider settings and an API key.
    #[instrument(skip(config, api_key), fields(base_url = %config.base_url()))]
    pub fn new(config: &ProviderConfig, api_key: String) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(*config.timeout_secs()))
            .build()
            .map_err(|e| FetchError::new(FetchErrorKind::Transport, e.to_string()))?;

        info!("Creating OpenWeatherMap client");
        Ok(Self {
            client,
            base_url: config.base_url().clone(),
            api_key,
            units: config.units().clone(),
        })
    }

    /// Builds the request URL for a city.
    fn url_for(&self, city: &City) -> Result<reqwest::Url, FetchError> {
        reqwest::Url::parse_with_params(
            &self.base_url,
            &[
                ("q", city.as_str()),
                ("appid", self.api_key.as_str()),
                ("units", self.units.as_str()),
            ],
        )
        .map_err(|e| FetchError::new(FetchErrorKind::Transport, format!("Bad provider URL: {}", e)))
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    #[instrument(skip(self), fields(city = %city))]
    async fn fetch_temperature(&self, city: &City) -> Result<WeatherReading, FetchError> {
        debug!("Requesting current weather");
        let response = self
            .client
            .get(self.url_for(city)?)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Weather request failed");
                FetchError::new(FetchErrorKind::Transport, e.to_string())
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::new(FetchErrorKind::Transport, e.to_string()))?;
        debug!(status = %status, "Got weather response");

        if !status.is_success() {
            return Err(status_error(status.as_u16(), &body));
        }

        decode_payload(&body)
    }
}

/// Decodes a current-weather body into a reading.
#[instrument(skip(body))]
pub fn decode_payload(body: &str) -> Result<WeatherReading, FetchError> {
    let weather: CurrentWeather = serde_json::from_str(body).map_err(|e| {
        warn!(error = %e, "Malformed weather payload");
        FetchError::new(FetchErrorKind::Malformed, e.to_string())
    })?;

    if !weather.main.temp.is_finite() {
        return Err(FetchError::new(
            FetchErrorKind::Malformed,
            "temperature is not finite",
        ));
    }

    Ok(WeatherReading::new(weather.name, weather.main.temp))
}

/// Builds a status error, keeping the provider's message when it sent one.
fn status_error(code: u16, body: &str) -> FetchError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.message)
        .unwrap_or_else(|_| "Error fetching weather data".to_string());
    warn!(code, %message, "Weather provider returned an error");
    FetchError::new(FetchErrorKind::Status(code), message)
}
