//! Daily aggregation of 3-hour forecast intervals

use chrono::{NaiveDate, TimeZone};
use serde::Serialize;

use crate::models::ForecastEntry;

/// At most this many days are summarized
pub const MAX_DAYS: usize = 7;

/// Scale from mean 3-hour rain volume (mm) to a 0-100 probability
const PRECIPITATION_SCALE: f64 = 10.0;

/// One calendar day of forecast
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    /// "Today" for the first day, short weekday otherwise
    pub label: String,
    /// e.g. "Oct 19"
    pub date_label: String,
    pub high: f64,
    pub low: f64,
    /// Mean relative humidity (0-100)
    pub humidity: f64,
    pub dominant_condition: String,
    pub icon_code: &'static str,
    /// Precipitation probability (0-100)
    pub precipitation_probability: u8,
    /// Strongest interval wind, in the forecast's native unit
    pub max_wind_speed: f64,
}

/// Icon for a condition group
#[must_use]
pub fn icon_for_condition(condition: &str) -> &'static str {
    match condition {
        "Clear" => "01d",
        "Clouds" => "02d",
        "Rain" => "10d",
        "Drizzle" => "09d",
        "Thunderstorm" => "11d",
        "Snow" => "13d",
        "Mist" | "Smoke" | "Haze" | "Dust" | "Fog" | "Sand" | "Ash" | "Squall" | "Tornado" => {
            "50d"
        }
        _ => "01d",
    }
}

#[derive(Default)]
struct DayBucket {
    temperatures: Vec<f64>,
    humidity_total: f64,
    rain_total: f64,
    max_wind_speed: f64,
    /// Condition counts in first-seen order
    conditions: Vec<(String, usize)>,
}

impl DayBucket {
    fn add(&mut self, entry: &ForecastEntry) {
        self.temperatures.push(entry.temperature);
        self.humidity_total += f64::from(entry.humidity);
        self.rain_total += entry.rain_3h;
        self.max_wind_speed = self.max_wind_speed.max(entry.wind_speed);
        match self
            .conditions
            .iter_mut()
            .find(|(condition, _)| *condition == entry.condition)
        {
            Some((_, count)) => *count += 1,
            None => self.conditions.push((entry.condition.clone(), 1)),
        }
    }

    /// Most frequent condition; ties go to the one seen first
    fn dominant_condition(&self) -> String {
        let mut best: Option<&(String, usize)> = None;
        for candidate in &self.conditions {
            if best.is_none_or(|(_, count)| candidate.1 > *count) {
                best = Some(candidate);
            }
        }
        best.map(|(condition, _)| condition.clone()).unwrap_or_default()
    }
}

/// Group entries by calendar date in `tz`, first-seen order, and summarize up to seven days
pub fn aggregate_daily<Tz: TimeZone>(entries: &[ForecastEntry], tz: &Tz) -> Vec<DailySummary> {
    let mut days: Vec<(NaiveDate, DayBucket)> = Vec::new();

    for entry in entries {
        let date = entry.timestamp.with_timezone(tz).date_naive();
        match days.iter_mut().find(|(day, _)| *day == date) {
            Some((_, bucket)) => bucket.add(entry),
            None => {
                let mut bucket = DayBucket::default();
                bucket.add(entry);
                days.push((date, bucket));
            }
        }
    }

    days.into_iter()
        .take(MAX_DAYS)
        .enumerate()
        .map(|(index, (date, bucket))| {
            let count = bucket.temperatures.len() as f64;
            let high = bucket
                .temperatures
                .iter()
                .copied()
                .fold(f64::NEG_INFINITY, f64::max);
            let low = bucket
                .temperatures
                .iter()
                .copied()
                .fold(f64::INFINITY, f64::min);
            let dominant_condition = bucket.dominant_condition();
            let precipitation =
                (bucket.rain_total / count * PRECIPITATION_SCALE).round().clamp(0.0, 100.0);

            DailySummary {
                date,
                label: if index == 0 {
                    "Today".to_string()
                } else {
                    date.format("%a").to_string()
                },
                date_label: date.format("%b %-d").to_string(),
                high,
                low,
                humidity: bucket.humidity_total / count,
                icon_code: icon_for_condition(&dominant_condition),
                dominant_condition,
                precipitation_probability: precipitation as u8,
                max_wind_speed: bucket.max_wind_speed,
            }
        })
        .collect()
}
