//! Interval forecasts and the synthesized historical series

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One 3-hour forecast interval
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ForecastEntry {
    pub timestamp: DateTime<Utc>,
    pub temperature: f64,
    /// Relative humidity percentage (0-100)
    pub humidity: u8,
    /// Condition group, e.g. "Clear", "Rain"
    pub condition: String,
    pub description: String,
    pub icon: String,
    /// Rain volume over the 3-hour interval in mm
    pub rain_3h: f64,
    /// Wind speed in the unit system's native unit (m/s or mph)
    #[serde(default)]
    pub wind_speed: f64,
}

/// Forecast collection as returned by the provider, in time order
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Forecast {
    pub entries: Vec<ForecastEntry>,
    pub city_name: Option<String>,
}

impl Forecast {
    #[must_use]
    pub fn new(entries: Vec<ForecastEntry>) -> Self {
        Self {
            entries,
            city_name: None,
        }
    }

    /// The next `count` intervals
    #[must_use]
    pub fn upcoming(&self, count: usize) -> &[ForecastEntry] {
        &self.entries[..self.entries.len().min(count)]
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One synthesized past day
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HistoricalDay {
    pub date: NaiveDate,
    pub temperature: f64,
    pub humidity: u8,
    pub precipitation_mm: u8,
}

/// Seven synthesized past days, oldest first. Illustrative only.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct HistoricalSeries {
    pub days: Vec<HistoricalDay>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(hour: u32) -> ForecastEntry {
        ForecastEntry {
            timestamp: Utc.with_ymd_and_hms(2024, 6, 1, hour, 0, 0).unwrap(),
            temperature: 20.0,
            humidity: 50,
            condition: "Clear".to_string(),
            description: "clear sky".to_string(),
            icon: "01d".to_string(),
            rain_3h: 0.0,
            wind_speed: 2.0,
        }
    }

    #[test]
    fn test_upcoming_caps_at_available_entries() {
        let forecast = Forecast::new(vec![entry(0), entry(3), entry(6)]);
        assert_eq!(forecast.upcoming(8).len(), 3);
        assert_eq!(forecast.upcoming(2).len(), 2);
        assert_eq!(forecast.upcoming(2)[1].timestamp.format("%H").to_string(), "03");
    }
}
