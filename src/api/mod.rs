//! Weather provider access
//!
//! [`WeatherSource`] is the seam between the fetch orchestrator and the
//! network; [`OpenWeatherClient`] is the production implementation.

pub mod client;
pub mod location_query;
pub mod openweather;

use async_trait::async_trait;

use crate::Result;
use crate::models::{AirQuality, Coordinates, CurrentWeather, Forecast, Location, UnitSystem};

pub use client::OpenWeatherClient;
pub use location_query::LocationQuery;
pub use openweather::GeocodingResult;

/// Data sources consumed by one fetch cycle plus place-name lookup
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn current_weather(&self, coordinates: Coordinates, units: UnitSystem) -> Result<CurrentWeather>;

    async fn forecast(&self, coordinates: Coordinates, units: UnitSystem) -> Result<Forecast>;

    /// `Ok(None)` when the provider answered without any reading
    async fn air_quality(&self, coordinates: Coordinates) -> Result<Option<AirQuality>>;

    /// UV index from the extended endpoint; `Ok(None)` when the answer carries no reading
    async fn uv_index(&self, coordinates: Coordinates, units: UnitSystem) -> Result<Option<f64>>;

    /// Best match for a free-text place name, if any
    async fn geocode(&self, query: &str) -> Result<Option<Location>>;
}
