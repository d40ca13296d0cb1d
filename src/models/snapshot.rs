//! The merged result of one fetch cycle

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AirQuality, Coordinates, CurrentWeather, Forecast, HistoricalSeries, UnitSystem, UvIndex};

/// Results of the individual sources; each is independently nullable
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct SnapshotPayload {
    pub current: Option<CurrentWeather>,
    pub forecast: Option<Forecast>,
    pub air_quality: Option<AirQuality>,
    pub uv: Option<UvIndex>,
    pub historical: Option<HistoricalSeries>,
}

/// Everything fetched for one (coordinates, unit system) pair at one instant
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FetchSnapshot {
    pub timestamp: DateTime<Utc>,
    pub coordinates: Coordinates,
    pub unit_system: UnitSystem,
    pub payload: SnapshotPayload,
}

impl FetchSnapshot {
    #[must_use]
    pub fn new(
        timestamp: DateTime<Utc>,
        coordinates: Coordinates,
        unit_system: UnitSystem,
        payload: SnapshotPayload,
    ) -> Self {
        Self {
            timestamp,
            coordinates,
            unit_system,
            payload,
        }
    }

    /// A snapshot can be shown only when current weather and forecast are both present
    #[must_use]
    pub fn is_displayable(&self) -> bool {
        self.payload.current.is_some() && self.payload.forecast.is_some()
    }

    /// Whether this snapshot answers a request for the given key
    #[must_use]
    pub fn matches(&self, coordinates: Coordinates, unit_system: UnitSystem) -> bool {
        self.coordinates == coordinates && self.unit_system == unit_system
    }
}
