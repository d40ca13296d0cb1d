//! Data models for the WeatherSense dashboard
//!
//! This module contains the core domain models organized by concern:
//! - Location: Geographic coordinates and place metadata
//! - Units: Measurement system and unit formatting
//! - Weather: Current conditions, air quality and UV readings
//! - Forecast: Interval forecasts and the synthesized history
//! - Snapshot: The merged result of one fetch cycle

pub mod forecast;
pub mod location;
pub mod snapshot;
pub mod units;
pub mod weather;

// Re-export all public types for convenient access
pub use forecast::{Forecast, ForecastEntry, HistoricalDay, HistoricalSeries};
pub use location::{Coordinates, Location};
pub use snapshot::{FetchSnapshot, SnapshotPayload};
pub use units::UnitSystem;
pub use weather::{AirQuality, CurrentWeather, UvIndex};
