//! Current conditions, air quality and UV readings

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current weather at a location, in the unit system it was requested with
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CurrentWeather {
    /// Place name reported by the provider
    pub location_name: String,
    pub observed_at: DateTime<Utc>,
    pub temperature: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    /// Relative humidity percentage (0-100)
    pub humidity: u8,
    /// Atmospheric pressure in hPa
    pub pressure: f64,
    /// Wind speed in m/s (metric) or mph (imperial)
    pub wind_speed: f64,
    /// Wind direction in degrees (0-360, where 0/360 is North)
    pub wind_direction: Option<u16>,
    /// Condition group, e.g. "Clear", "Rain"
    pub condition: String,
    /// Human-readable description of weather conditions
    pub description: String,
    /// Weather condition icon ID from API
    pub icon: String,
    pub sunrise: Option<DateTime<Utc>>,
    pub sunset: Option<DateTime<Utc>>,
}

impl CurrentWeather {
    /// Convert wind direction from degrees to cardinal direction
    #[must_use]
    pub fn wind_direction_to_cardinal(degrees: u16) -> &'static str {
        match degrees {
            0..=22 | 338..=360 => "N",
            23..=67 => "NE",
            68..=112 => "E",
            113..=157 => "SE",
            158..=202 => "S",
            203..=247 => "SW",
            248..=292 => "W",
            293..=337 => "NW",
            _ => "Unknown",
        }
    }

    /// Position of the sun between sunrise (0) and sunset (100)
    ///
    /// Returns `None` when the provider did not report sun times.
    #[must_use]
    pub fn sun_position(&self, now: DateTime<Utc>) -> Option<f64> {
        let (sunrise, sunset) = (self.sunrise?, self.sunset?);
        if now < sunrise {
            Some(0.0)
        } else if now > sunset {
            Some(100.0)
        } else {
            let day_length = (sunset - sunrise).num_milliseconds() as f64;
            if day_length <= 0.0 {
                return Some(100.0);
            }
            let elapsed = (now - sunrise).num_milliseconds() as f64;
            Some((elapsed / day_length * 100.0).clamp(0.0, 100.0))
        }
    }
}

/// Air quality index on the provider's 1-5 scale
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct AirQuality {
    pub aqi: u8,
    /// Fine particulate matter in μg/m³
    pub pm2_5: Option<f64>,
}

impl AirQuality {
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self.aqi {
            1 => "Good",
            2 => "Fair",
            3 => "Moderate",
            4 => "Poor",
            5 => "Very Poor",
            _ => "Unknown",
        }
    }
}

/// UV index reading, or the placeholder used when the optional source failed
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct UvIndex {
    pub value: f64,
    /// True when `value` is the fallback constant rather than a measurement
    pub is_fallback: bool,
}

impl UvIndex {
    #[must_use]
    pub fn measured(value: f64) -> Self {
        Self {
            value,
            is_fallback: false,
        }
    }

    #[must_use]
    pub fn fallback(value: f64) -> Self {
        Self {
            value,
            is_fallback: true,
        }
    }

    /// One decimal, or "N/A" for a zero reading
    #[must_use]
    pub fn display_value(&self) -> String {
        if self.value == 0.0 {
            "N/A".to_string()
        } else {
            format!("{:.1}", self.value)
        }
    }
}
