//! OpenWeatherMap HTTP client
//!
//! One GET per call, no retries. Failures map to [`WeatherSenseError::Network`]
//! and the API key never reaches the logs.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, instrument, warn};

use super::WeatherSource;
use super::openweather::{
    AirPollutionResponse, CurrentResponse, ForecastResponse, GeocodingResult, OneCallResponse,
};
use crate::config::WeatherConfig;
use crate::models::{AirQuality, Coordinates, CurrentWeather, Forecast, Location, UnitSystem};
use crate::{Result, WeatherSenseError};

/// Responses slower than this are logged as warnings
const SLOW_RESPONSE: Duration = Duration::from_secs(5);

/// Weather API client for OpenWeatherMap
pub struct OpenWeatherClient {
    client: Client,
    base_url: String,
    geocoding_url: String,
    api_key: String,
}

impl OpenWeatherClient {
    /// Create a new weather API client
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        let api_key = config.require_api_key()?.to_string();
        let timeout = Duration::from_secs(config.timeout_seconds.into());

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("WeatherSense/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| WeatherSenseError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            geocoding_url: config.geocoding_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn weather_url(&self, endpoint: &str, coordinates: Coordinates, query: &str) -> String {
        format!(
            "{}/{endpoint}?lat={}&lon={}{query}&appid={}",
            self.base_url, coordinates.latitude, coordinates.longitude, self.api_key
        )
    }

    fn redact(&self, url: &str) -> String {
        url.replace(&self.api_key, "***")
    }

    /// Issue a GET and decode the JSON body
    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str, url: &str) -> Result<T> {
        let request_start = Instant::now();
        debug!("Requesting {}", self.redact(url));

        let response = self.client.get(url).send().await.map_err(|e| {
            let e = e.without_url();
            warn!(
                "Network error on {} after {:.3}s: {}",
                endpoint,
                request_start.elapsed().as_secs_f64(),
                e
            );
            WeatherSenseError::transport(format!("Request to {endpoint} failed"), e)
        })?;

        let status = response.status();
        debug!(
            "HTTP response received: {} in {:.3}s",
            status,
            request_start.elapsed().as_secs_f64()
        );

        if !status.is_success() {
            let message = match status.as_u16() {
                401 => {
                    error!("API authentication failed (HTTP 401)");
                    "Invalid API key. Please check your OpenWeatherMap API key.".to_string()
                }
                404 => {
                    warn!("{} returned HTTP 404", endpoint);
                    format!("No data found at {endpoint} (HTTP 404)")
                }
                429 => {
                    warn!("Server rate limit exceeded (HTTP 429)");
                    "Weather provider rate limit exceeded (HTTP 429)".to_string()
                }
                _ => {
                    let msg = format!(
                        "API request failed with status: {} - {}",
                        status,
                        status.canonical_reason().unwrap_or("Unknown error")
                    );
                    warn!("{} on {}", msg, endpoint);
                    msg
                }
            };
            return Err(WeatherSenseError::http_status(status.as_u16(), message));
        }

        let parse_start = Instant::now();
        let body = response.json::<T>().await.map_err(|e| {
            let e = e.without_url();
            error!("Failed to parse {} response: {}", endpoint, e);
            WeatherSenseError::transport(format!("Invalid {endpoint} response"), e)
        })?;

        let total_duration = request_start.elapsed();
        info!(
            "Fetched {} in {:.3}s (parse: {:.3}s)",
            endpoint,
            total_duration.as_secs_f64(),
            parse_start.elapsed().as_secs_f64()
        );

        if total_duration > SLOW_RESPONSE {
            warn!(
                "Slow API response detected on {}: {:.3}s",
                endpoint,
                total_duration.as_secs_f64()
            );
        }

        Ok(body)
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherClient {
    #[instrument(skip(self), fields(lat = coordinates.latitude, lon = coordinates.longitude))]
    async fn current_weather(&self, coordinates: Coordinates, units: UnitSystem) -> Result<CurrentWeather> {
        let url = self.weather_url("weather", coordinates, &format!("&units={units}"));
        let response: CurrentResponse = self.get_json("weather", &url).await?;
        Ok(response.into())
    }

    #[instrument(skip(self), fields(lat = coordinates.latitude, lon = coordinates.longitude))]
    async fn forecast(&self, coordinates: Coordinates, units: UnitSystem) -> Result<Forecast> {
        let url = self.weather_url("forecast", coordinates, &format!("&units={units}"));
        let response: ForecastResponse = self.get_json("forecast", &url).await?;
        Ok(response.into())
    }

    #[instrument(skip(self), fields(lat = coordinates.latitude, lon = coordinates.longitude))]
    async fn air_quality(&self, coordinates: Coordinates) -> Result<Option<AirQuality>> {
        let url = self.weather_url("air_pollution", coordinates, "");
        let response: AirPollutionResponse = self.get_json("air_pollution", &url).await?;
        Ok(response.into_air_quality())
    }

    #[instrument(skip(self), fields(lat = coordinates.latitude, lon = coordinates.longitude))]
    async fn uv_index(&self, coordinates: Coordinates, units: UnitSystem) -> Result<Option<f64>> {
        let url = self.weather_url(
            "onecall",
            coordinates,
            &format!("&units={units}&exclude=minutely,alerts"),
        );
        let response: OneCallResponse = self.get_json("onecall", &url).await?;
        Ok(response.uv_index())
    }

    #[instrument(skip(self))]
    async fn geocode(&self, query: &str) -> Result<Option<Location>> {
        info!("Geocoding location: '{}'", query);
        let url = format!(
            "{}/direct?q={}&limit=1&appid={}",
            self.geocoding_url,
            urlencoding::encode(query),
            self.api_key
        );

        let results: Vec<GeocodingResult> = self.get_json("geocoding", &url).await?;
        match results.into_iter().next() {
            Some(result) => {
                debug!("Geocoded '{}' to {} ({:.4}, {:.4})", query, result.name, result.lat, result.lon);
                Ok(Some(result.into()))
            }
            None => {
                warn!("No results found for location '{}'", query);
                Ok(None)
            }
        }
    }
}
