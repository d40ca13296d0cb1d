//! OpenWeatherMap response schemas and their conversion into domain models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{AirQuality, CurrentWeather, Forecast, ForecastEntry, Location};

#[derive(Debug, Deserialize)]
pub struct MainBlock {
    pub temp: f64,
    #[serde(default)]
    pub feels_like: Option<f64>,
    #[serde(default)]
    pub temp_min: Option<f64>,
    #[serde(default)]
    pub temp_max: Option<f64>,
    #[serde(default)]
    pub pressure: Option<f64>,
    #[serde(default)]
    pub humidity: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct ConditionBlock {
    pub main: String,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct WindBlock {
    #[serde(default)]
    pub speed: f64,
    #[serde(default)]
    pub deg: Option<f64>,
}

#[derive(Debug, Deserialize, Default)]
pub struct SysBlock {
    #[serde(default)]
    pub sunrise: Option<i64>,
    #[serde(default)]
    pub sunset: Option<i64>,
}

/// `/weather` response
#[derive(Debug, Deserialize)]
pub struct CurrentResponse {
    #[serde(default)]
    pub name: String,
    pub dt: i64,
    pub main: MainBlock,
    #[serde(default)]
    pub weather: Vec<ConditionBlock>,
    #[serde(default)]
    pub wind: WindBlock,
    #[serde(default)]
    pub sys: SysBlock,
}

#[derive(Debug, Deserialize, Default)]
pub struct RainBlock {
    #[serde(rename = "3h", default)]
    pub three_hours: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct ForecastItem {
    pub dt: i64,
    pub main: MainBlock,
    #[serde(default)]
    pub weather: Vec<ConditionBlock>,
    #[serde(default)]
    pub rain: Option<RainBlock>,
    #[serde(default)]
    pub wind: WindBlock,
}

#[derive(Debug, Deserialize)]
pub struct CityBlock {
    pub name: String,
}

/// `/forecast` response
#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
    pub list: Vec<ForecastItem>,
    #[serde(default)]
    pub city: Option<CityBlock>,
}

#[derive(Debug, Deserialize)]
pub struct AqiBlock {
    pub aqi: u8,
}

#[derive(Debug, Deserialize, Default)]
pub struct Components {
    #[serde(default)]
    pub pm2_5: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct AirPollutionItem {
    pub main: AqiBlock,
    #[serde(default)]
    pub components: Components,
}

/// `/air_pollution` response
#[derive(Debug, Deserialize)]
pub struct AirPollutionResponse {
    pub list: Vec<AirPollutionItem>,
}

#[derive(Debug, Deserialize)]
pub struct OneCallCurrent {
    #[serde(default)]
    pub uvi: Option<f64>,
}

/// `/onecall` response, only the UV reading is used
#[derive(Debug, Deserialize)]
pub struct OneCallResponse {
    #[serde(default)]
    pub current: Option<OneCallCurrent>,
}

/// Geocoding result from the direct geocoding endpoint
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GeocodingResult {
    /// Location name
    pub name: String,
    /// Latitude
    pub lat: f64,
    /// Longitude
    pub lon: f64,
    /// Country code
    #[serde(default)]
    pub country: Option<String>,
    /// State (for US locations)
    #[serde(default)]
    pub state: Option<String>,
}

impl From<GeocodingResult> for Location {
    fn from(geocoding: GeocodingResult) -> Self {
        let name = if let Some(state) = geocoding.state {
            format!("{}, {}", geocoding.name, state)
        } else {
            geocoding.name
        };

        match geocoding.country {
            Some(country) => Location::with_country(geocoding.lat, geocoding.lon, name, country),
            None => Location::new(geocoding.lat, geocoding.lon, name),
        }
    }
}

fn timestamp(seconds: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(seconds, 0).unwrap_or_default()
}

fn humidity_percent(value: Option<f64>) -> u8 {
    value.unwrap_or(0.0).round().clamp(0.0, 100.0) as u8
}

/// First condition block, or a neutral placeholder when the provider sent none
fn primary_condition(blocks: Vec<ConditionBlock>) -> ConditionBlock {
    blocks.into_iter().next().unwrap_or(ConditionBlock {
        main: "Unknown".to_string(),
        description: "unknown".to_string(),
        icon: "01d".to_string(),
    })
}

impl From<CurrentResponse> for CurrentWeather {
    fn from(response: CurrentResponse) -> Self {
        let condition = primary_condition(response.weather);
        let main = response.main;
        Self {
            location_name: response.name,
            observed_at: timestamp(response.dt),
            temperature: main.temp,
            feels_like: main.feels_like.unwrap_or(main.temp),
            temp_min: main.temp_min.unwrap_or(main.temp),
            temp_max: main.temp_max.unwrap_or(main.temp),
            humidity: humidity_percent(main.humidity),
            pressure: main.pressure.unwrap_or(0.0),
            wind_speed: response.wind.speed,
            wind_direction: response.wind.deg.map(|deg| deg.round().rem_euclid(360.0) as u16),
            condition: condition.main,
            description: condition.description,
            icon: condition.icon,
            sunrise: response.sys.sunrise.map(timestamp),
            sunset: response.sys.sunset.map(timestamp),
        }
    }
}

impl From<ForecastItem> for ForecastEntry {
    fn from(item: ForecastItem) -> Self {
        let condition = primary_condition(item.weather);
        Self {
            timestamp: timestamp(item.dt),
            temperature: item.main.temp,
            humidity: humidity_percent(item.main.humidity),
            condition: condition.main,
            description: condition.description,
            icon: condition.icon,
            rain_3h: item.rain.and_then(|rain| rain.three_hours).unwrap_or(0.0),
            wind_speed: item.wind.speed,
        }
    }
}

impl From<ForecastResponse> for Forecast {
    fn from(response: ForecastResponse) -> Self {
        Self {
            entries: response.list.into_iter().map(ForecastEntry::from).collect(),
            city_name: response.city.map(|city| city.name),
        }
    }
}

impl AirPollutionResponse {
    /// The first reading, if the provider returned any
    #[must_use]
    pub fn into_air_quality(self) -> Option<AirQuality> {
        self.list.into_iter().next().map(|item| AirQuality {
            aqi: item.main.aqi,
            pm2_5: item.components.pm2_5,
        })
    }
}

impl OneCallResponse {
    #[must_use]
    pub fn uv_index(&self) -> Option<f64> {
        self.current.as_ref().and_then(|current| current.uvi)
    }
}
