//! Fetch orchestration
//!
//! One fetch cycle fans out to the three required sources and the optional
//! UV source at once. Any required failure fails the cycle; a UV failure is
//! absorbed and replaced by [`FALLBACK_UV_INDEX`].

use chrono::{Datelike, Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use std::f64::consts::PI;
use std::sync::{Arc, Mutex};
use tracing::{info, instrument, warn};

use crate::api::WeatherSource;
use crate::clock::Clock;
use crate::models::{
    Coordinates, FetchSnapshot, HistoricalDay, HistoricalSeries, SnapshotPayload, UnitSystem,
    UvIndex,
};
use crate::{Result, WeatherSenseError};

/// UV value used when the optional source fails or has no reading
pub const FALLBACK_UV_INDEX: f64 = 0.0;

/// Number of synthesized past days
pub const HISTORY_DAYS: i64 = 7;

/// Procedural stand-in for historical observations. Illustrative only.
pub struct HistoricalGenerator {
    rng: Mutex<StdRng>,
}

impl HistoricalGenerator {
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::seeded(rand::rng().random())
    }

    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Seven days before `today`, oldest first
    pub fn generate(&self, today: NaiveDate) -> HistoricalSeries {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let days = (1..=HISTORY_DAYS)
            .rev()
            .map(|days_ago| {
                let date = today - Duration::days(days_ago);
                let seasonal = ((f64::from(date.month0()) - 6.0) * PI / 6.0).sin() * 10.0;
                let base = 15.0 + seasonal;
                let precipitation_mm = if rng.random_bool(0.3) {
                    rng.random_range(0..10)
                } else {
                    0
                };
                HistoricalDay {
                    date,
                    temperature: (base + rng.random_range(-5.0..5.0)).round(),
                    humidity: 40 + rng.random_range(0..40),
                    precipitation_mm,
                }
            })
            .collect();

        HistoricalSeries { days }
    }
}

pub struct FetchOrchestrator {
    source: Arc<dyn WeatherSource>,
    history: HistoricalGenerator,
    clock: Arc<dyn Clock>,
}

impl FetchOrchestrator {
    #[must_use]
    pub fn new(source: Arc<dyn WeatherSource>, history: HistoricalGenerator, clock: Arc<dyn Clock>) -> Self {
        Self {
            source,
            history,
            clock,
        }
    }

    /// Run one fetch cycle and assemble the snapshot
    #[instrument(skip_all, fields(lat = coordinates.latitude, lon = coordinates.longitude, units = %units))]
    pub async fn fetch(&self, coordinates: Coordinates, units: UnitSystem) -> Result<FetchSnapshot> {
        let source = self.source.as_ref();

        let required = async {
            tokio::try_join!(
                source.current_weather(coordinates, units),
                source.forecast(coordinates, units),
                source.air_quality(coordinates),
            )
        };
        let optional = source.uv_index(coordinates, units);

        let (required, optional) = tokio::join!(required, optional);
        let (current, forecast, air_quality) = required.map_err(|e| {
            warn!("Required source failed: {}", e);
            e.into_network()
        })?;

        let uv = match optional {
            Ok(Some(value)) => UvIndex::measured(value),
            Ok(None) => UvIndex::fallback(FALLBACK_UV_INDEX),
            Err(e) => {
                let absorbed = WeatherSenseError::optional_source("onecall", e.to_string());
                warn!("{}; using fallback UV index {}", absorbed, FALLBACK_UV_INDEX);
                UvIndex::fallback(FALLBACK_UV_INDEX)
            }
        };

        let now = self.clock.now();
        let historical = self.history.generate(now.date_naive());

        info!(
            "Fetched {} forecast entries for {}",
            forecast.entries.len(),
            current.location_name
        );

        Ok(FetchSnapshot::new(
            now,
            coordinates,
            units,
            SnapshotPayload {
                current: Some(current),
                forecast: Some(forecast),
                air_quality,
                uv: Some(uv),
                historical: Some(historical),
            },
        ))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::models::{AirQuality, CurrentWeather, Forecast, ForecastEntry, Location};
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory source with switchable failures
    pub(crate) struct FakeSource {
        pub fail_required: bool,
        pub uv: std::result::Result<Option<f64>, ()>,
        pub calls: AtomicUsize,
    }

    impl FakeSource {
        pub(crate) fn healthy() -> Self {
            Self {
                fail_required: false,
                uv: Ok(Some(5.5)),
                calls: AtomicUsize::new(0),
            }
        }
    }

    pub(crate) fn sample_current(units: UnitSystem) -> CurrentWeather {
        CurrentWeather {
            location_name: "New York".to_string(),
            observed_at: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
            temperature: if units == UnitSystem::Metric { 22.0 } else { 71.6 },
            feels_like: 21.0,
            temp_min: 18.0,
            temp_max: 25.0,
            humidity: 60,
            pressure: 1013.0,
            wind_speed: 3.0,
            wind_direction: Some(200),
            condition: "Clear".to_string(),
            description: "clear sky".to_string(),
            icon: "01d".to_string(),
            sunrise: Some(Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap()),
            sunset: Some(Utc.with_ymd_and_hms(2024, 6, 2, 0, 30, 0).unwrap()),
        }
    }

    pub(crate) fn sample_forecast() -> Forecast {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        Forecast::new(
            (0..40)
                .map(|i| ForecastEntry {
                    timestamp: start + Duration::hours(3 * i),
                    temperature: 15.0 + (i % 8) as f64,
                    humidity: 50,
                    condition: "Clear".to_string(),
                    description: "clear sky".to_string(),
                    icon: "01d".to_string(),
                    rain_3h: 0.0,
                    wind_speed: 3.0,
                })
                .collect(),
        )
    }

    #[async_trait]
    impl WeatherSource for FakeSource {
        async fn current_weather(&self, _: Coordinates, units: UnitSystem) -> Result<CurrentWeather> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_required {
                return Err(WeatherSenseError::http_status(500, "server error"));
            }
            Ok(sample_current(units))
        }

        async fn forecast(&self, _: Coordinates, _: UnitSystem) -> Result<Forecast> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(sample_forecast())
        }

        async fn air_quality(&self, _: Coordinates) -> Result<Option<AirQuality>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Some(AirQuality { aqi: 2, pm2_5: None }))
        }

        async fn uv_index(&self, _: Coordinates, _: UnitSystem) -> Result<Option<f64>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.uv
                .map_err(|()| WeatherSenseError::network("onecall timed out"))
        }

        async fn geocode(&self, query: &str) -> Result<Option<Location>> {
            Ok((query == "New York").then(|| Location::new(40.7, -74.0, "New York".to_string())))
        }
    }

    fn orchestrator(source: FakeSource) -> FetchOrchestrator {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap());
        FetchOrchestrator::new(Arc::new(source), HistoricalGenerator::seeded(7), Arc::new(clock))
    }

    #[tokio::test]
    async fn test_fetch_assembles_all_sources() {
        let snapshot = orchestrator(FakeSource::healthy())
            .fetch(Coordinates::new(40.7, -74.0), UnitSystem::Metric)
            .await
            .unwrap();

        assert!(snapshot.is_displayable());
        assert_eq!(snapshot.payload.uv, Some(UvIndex::measured(5.5)));
        assert_eq!(snapshot.payload.air_quality.map(|a| a.aqi), Some(2));
        assert_eq!(snapshot.payload.historical.as_ref().map(|h| h.days.len()), Some(7));
    }

    #[tokio::test]
    async fn test_optional_failure_uses_fallback() {
        let source = FakeSource {
            uv: Err(()),
            ..FakeSource::healthy()
        };
        let snapshot = orchestrator(source)
            .fetch(Coordinates::new(40.7, -74.0), UnitSystem::Metric)
            .await
            .unwrap();

        let uv = snapshot.payload.uv.unwrap();
        assert_eq!(uv.value, FALLBACK_UV_INDEX);
        assert!(uv.is_fallback);
        assert_eq!(snapshot.payload.current.unwrap().temperature, 22.0);
    }

    #[tokio::test]
    async fn test_missing_uv_reading_uses_fallback() {
        let source = FakeSource {
            uv: Ok(None),
            ..FakeSource::healthy()
        };
        let snapshot = orchestrator(source)
            .fetch(Coordinates::new(40.7, -74.0), UnitSystem::Metric)
            .await
            .unwrap();
        assert_eq!(snapshot.payload.uv, Some(UvIndex::fallback(FALLBACK_UV_INDEX)));
    }

    #[tokio::test]
    async fn test_required_failure_fails_cycle() {
        let source = FakeSource {
            fail_required: true,
            ..FakeSource::healthy()
        };
        let err = orchestrator(source)
            .fetch(Coordinates::new(40.7, -74.0), UnitSystem::Metric)
            .await
            .unwrap_err();
        assert!(matches!(err, WeatherSenseError::Network { status: Some(500), .. }));
    }

    #[test]
    fn test_history_is_oldest_first_and_in_range() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let series = HistoricalGenerator::seeded(42).generate(today);

        assert_eq!(series.days.len(), 7);
        assert_eq!(series.days[0].date, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
        assert_eq!(series.days[6].date, NaiveDate::from_ymd_opt(2024, 1, 9).unwrap());
        for day in &series.days {
            // January: base = 15 + sin(-π)·10 = 15
            assert!((10.0..=20.0).contains(&day.temperature));
            assert!((40..80).contains(&day.humidity));
            assert!(day.precipitation_mm < 10);
        }
    }

    #[test]
    fn test_history_is_reproducible_with_seed() {
        let today = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        assert_eq!(
            HistoricalGenerator::seeded(1).generate(today),
            HistoricalGenerator::seeded(1).generate(today)
        );
    }
}
