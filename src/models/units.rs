//! Measurement system selection and unit-dependent formatting

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::WeatherSenseError;

/// Measurement system requested from the weather API
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    /// Value of the `units` query parameter
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
        }
    }

    #[must_use]
    pub fn toggled(&self) -> Self {
        match self {
            UnitSystem::Metric => UnitSystem::Imperial,
            UnitSystem::Imperial => UnitSystem::Metric,
        }
    }

    /// Temperature suffix including the degree sign
    #[must_use]
    pub fn temperature_suffix(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "°C",
            UnitSystem::Imperial => "°F",
        }
    }

    /// Label shown on the units toggle
    #[must_use]
    pub fn toggle_label(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "°C",
            UnitSystem::Imperial => "°F",
        }
    }

    /// Convert a wind speed reported in this system (m/s or mph) to km/h
    #[must_use]
    pub fn wind_speed_kmh(&self, speed: f64) -> f64 {
        match self {
            UnitSystem::Metric => speed * 3.6,
            UnitSystem::Imperial => speed * 1.609,
        }
    }

    /// Round a temperature and append the unit suffix, e.g. "22°C"
    #[must_use]
    pub fn format_temperature(&self, value: f64) -> String {
        format!("{}{}", value.round() as i64, self.temperature_suffix())
    }

    /// Convert a temperature in this system to Celsius
    #[must_use]
    pub fn to_celsius(&self, value: f64) -> f64 {
        match self {
            UnitSystem::Metric => value,
            UnitSystem::Imperial => (value - 32.0) * 5.0 / 9.0,
        }
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnitSystem {
    type Err = WeatherSenseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "metric" => Ok(UnitSystem::Metric),
            "imperial" => Ok(UnitSystem::Imperial),
            other => Err(WeatherSenseError::validation(format!(
                "Unknown unit system '{other}'. Must be one of: metric, imperial"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_toggle_flips() {
        assert_eq!(UnitSystem::Metric.toggled(), UnitSystem::Imperial);
        assert_eq!(UnitSystem::Imperial.toggled(), UnitSystem::Metric);
    }

    #[rstest]
    #[case(UnitSystem::Metric, 10.0, 36.0)]
    #[case(UnitSystem::Imperial, 10.0, 16.09)]
    fn test_wind_speed_kmh(#[case] units: UnitSystem, #[case] speed: f64, #[case] expected: f64) {
        assert!((units.wind_speed_kmh(speed) - expected).abs() < 1e-9);
    }

    #[rstest]
    #[case(UnitSystem::Metric, 21.6, "22°C")]
    #[case(UnitSystem::Imperial, 71.4, "71°F")]
    #[case(UnitSystem::Metric, -3.5, "-4°C")]
    #[case(UnitSystem::Metric, -0.2, "0°C")]
    fn test_format_temperature(
        #[case] units: UnitSystem,
        #[case] value: f64,
        #[case] expected: &str,
    ) {
        assert_eq!(units.format_temperature(value), expected);
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&UnitSystem::Imperial).unwrap();
        assert_eq!(json, "\"imperial\"");
        let parsed: UnitSystem = serde_json::from_str("\"metric\"").unwrap();
        assert_eq!(parsed, UnitSystem::Metric);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("Imperial".parse::<UnitSystem>().unwrap(), UnitSystem::Imperial);
        assert!("kelvin".parse::<UnitSystem>().is_err());
    }
}
