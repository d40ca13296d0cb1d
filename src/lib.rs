//! `WeatherSense` - Weather dashboard core
//!
//! This library provides cached multi-source weather fetching, daily
//! aggregation, personalised recommendations and the event handlers that
//! keep a dashboard display in sync.

pub mod aggregation;
pub mod api;
pub mod app;
pub mod clock;
pub mod config;
pub mod error;
pub mod fetch;
pub mod freshness;
pub mod geolocation;
pub mod logging;
pub mod models;
pub mod notifications;
pub mod preferences;
pub mod rate_limit;
pub mod recommendations;
pub mod simulated;
pub mod storage;
pub mod sync;

// Re-export core types for public API
pub use aggregation::{DailySummary, aggregate_daily};
pub use api::{LocationQuery, OpenWeatherClient, WeatherSource};
pub use app::{AppContext, Tab};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::WeatherSenseConfig;
pub use error::{GeolocationError, WeatherSenseError};
pub use fetch::FetchOrchestrator;
pub use freshness::FreshnessCache;
pub use models::{Coordinates, FetchSnapshot, Location, UnitSystem};
pub use preferences::{Preferences, Theme};
pub use recommendations::UserPreferences;
pub use sync::{DisplaySurface, Field, TextDisplay, UiSynchronizer};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, WeatherSenseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
