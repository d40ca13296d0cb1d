//! Pushes a fetch snapshot into bound display fields
//!
//! Primary fields are written first, each only if the display has it, then
//! the hourly list, daily cards, recommendations and simulated panel. Charts
//! and animation are external renderers that may fail; a failure is logged
//! and recorded in the [`SyncReport`] without touching the other steps.

use chrono::{DateTime, FixedOffset, Local, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::{debug, error, instrument, warn};

use crate::aggregation::{DailySummary, aggregate_daily};
use crate::fetch::FALLBACK_UV_INDEX;
use crate::models::{
    CurrentWeather, FetchSnapshot, Forecast, ForecastEntry, HistoricalSeries, UnitSystem, UvIndex,
};
use crate::preferences::Theme;
use crate::recommendations::{self, UserPreferences};
use crate::simulated::{RandomSimulation, SimulatedDataProvider, SimulatedPanel};
use crate::{Result, WeatherSenseError};

/// Entries shown in the hourly strip
pub const HOURLY_ENTRIES: usize = 8;
/// Forecast entries fed to the daily cards
pub const DAILY_SOURCE_ENTRIES: usize = 24;

pub const DEFAULT_ICON_BASE_URL: &str = "https://openweathermap.org/img/wn";

/// A bound display element
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Field {
    LocationName,
    CurrentTemp,
    FeelsLike,
    WeatherDescription,
    WindSpeed,
    WindDirection,
    Humidity,
    Pressure,
    Aqi,
    UvIndex,
    HighTemp,
    LowTemp,
    WeatherIcon,
    SunriseTime,
    SunsetTime,
    SunPosition,
    LocationTime,
    LastUpdated,
    HourlyForecast,
    DailyForecast,
    HealthWellnessRecommendation,
    ActivityRecommendation,
    UvRecommendation,
    WaterRecommendation,
    FoodRecommendation,
    TravelRecommendation,
    AgricultureRecommendation,
    EnergyRecommendation,
    WeatherAlerts,
    MeteorologicalData,
    ThemeToggle,
    UnitsToggle,
    ErrorNotification,
    ErrorMessage,
    LoadingOverlay,
    SearchButton,
    LocationSearch,
    CurrentLocationButton,
    RefreshButton,
    ActiveTab,
}

impl Field {
    pub const ALL: [Field; 40] = [
        Field::LocationName,
        Field::CurrentTemp,
        Field::FeelsLike,
        Field::WeatherDescription,
        Field::WindSpeed,
        Field::WindDirection,
        Field::Humidity,
        Field::Pressure,
        Field::Aqi,
        Field::UvIndex,
        Field::HighTemp,
        Field::LowTemp,
        Field::WeatherIcon,
        Field::SunriseTime,
        Field::SunsetTime,
        Field::SunPosition,
        Field::LocationTime,
        Field::LastUpdated,
        Field::HourlyForecast,
        Field::DailyForecast,
        Field::HealthWellnessRecommendation,
        Field::ActivityRecommendation,
        Field::UvRecommendation,
        Field::WaterRecommendation,
        Field::FoodRecommendation,
        Field::TravelRecommendation,
        Field::AgricultureRecommendation,
        Field::EnergyRecommendation,
        Field::WeatherAlerts,
        Field::MeteorologicalData,
        Field::ThemeToggle,
        Field::UnitsToggle,
        Field::ErrorNotification,
        Field::ErrorMessage,
        Field::LoadingOverlay,
        Field::SearchButton,
        Field::LocationSearch,
        Field::CurrentLocationButton,
        Field::RefreshButton,
        Field::ActiveTab,
    ];

    /// Element id as used by the page markup
    #[must_use]
    pub fn id(&self) -> &'static str {
        match self {
            Field::LocationName => "locationName",
            Field::CurrentTemp => "currentTemp",
            Field::FeelsLike => "feelsLike",
            Field::WeatherDescription => "weatherDescription",
            Field::WindSpeed => "windSpeed",
            Field::WindDirection => "windDirection",
            Field::Humidity => "humidity",
            Field::Pressure => "pressure",
            Field::Aqi => "aqi",
            Field::UvIndex => "uvIndex",
            Field::HighTemp => "highTemp",
            Field::LowTemp => "lowTemp",
            Field::WeatherIcon => "weatherIcon",
            Field::SunriseTime => "sunriseTime",
            Field::SunsetTime => "sunsetTime",
            Field::SunPosition => "sunPosition",
            Field::LocationTime => "locationTime",
            Field::LastUpdated => "lastUpdated",
            Field::HourlyForecast => "hourlyForecast",
            Field::DailyForecast => "dailyForecast",
            Field::HealthWellnessRecommendation => "healthWellnessRecommendation",
            Field::ActivityRecommendation => "activityRecommendation",
            Field::UvRecommendation => "uvRecommendation",
            Field::WaterRecommendation => "waterRecommendation",
            Field::FoodRecommendation => "foodRecommendation",
            Field::TravelRecommendation => "travelRecommendation",
            Field::AgricultureRecommendation => "agricultureRecommendation",
            Field::EnergyRecommendation => "energyRecommendation",
            Field::WeatherAlerts => "weatherAlerts",
            Field::MeteorologicalData => "meteorologicalData",
            Field::ThemeToggle => "themeToggle",
            Field::UnitsToggle => "unitsToggle",
            Field::ErrorNotification => "errorNotification",
            Field::ErrorMessage => "errorMessage",
            Field::LoadingOverlay => "loadingOverlay",
            Field::SearchButton => "searchBtn",
            Field::LocationSearch => "locationSearch",
            Field::CurrentLocationButton => "currentLocationBtn",
            Field::RefreshButton => "refreshBtn",
            Field::ActiveTab => "activeTab",
        }
    }
}

/// Quality band shown next to AQI and UV values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Indicator {
    Good,
    Moderate,
    Poor,
    Bad,
}

impl Indicator {
    #[must_use]
    pub fn for_aqi(aqi: u8) -> Self {
        match aqi {
            0..=2 => Indicator::Good,
            3 => Indicator::Moderate,
            4 => Indicator::Poor,
            _ => Indicator::Bad,
        }
    }

    #[must_use]
    pub fn for_uv(uv: f64) -> Self {
        if uv < 3.0 {
            Indicator::Good
        } else if uv < 6.0 {
            Indicator::Moderate
        } else if uv < 8.0 {
            Indicator::Poor
        } else {
            Indicator::Bad
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Indicator::Good => "good",
            Indicator::Moderate => "moderate",
            Indicator::Poor => "poor",
            Indicator::Bad => "bad",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyItem {
    /// Local hour, e.g. "15:00"
    pub time: String,
    pub temperature: String,
    pub humidity: String,
    pub icon_url: String,
    pub description: String,
}

/// Animation selected from the main condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AnimationKind {
    Clear,
    Rain,
    Snow,
    Cloudy,
    Thunder,
}

impl AnimationKind {
    #[must_use]
    pub fn for_condition(condition: &str) -> Self {
        if condition.contains("Rain") || condition.contains("Drizzle") {
            AnimationKind::Rain
        } else if condition.contains("Snow") {
            AnimationKind::Snow
        } else if condition.contains("Cloud") {
            AnimationKind::Cloudy
        } else if condition.contains("Thunder") {
            AnimationKind::Thunder
        } else {
            AnimationKind::Clear
        }
    }
}

/// Something that shows bound fields. Writes to absent fields are ignored by callers.
pub trait DisplaySurface {
    fn has(&self, field: Field) -> bool;
    fn set_text(&mut self, field: Field, text: &str);
    fn set_indicator(&mut self, field: Field, indicator: Indicator);
    fn set_image(&mut self, field: Field, url: &str, alt: &str);
    fn set_visible(&mut self, field: Field, visible: bool);
    fn set_hourly(&mut self, items: Vec<HourlyItem>);
    fn set_daily(&mut self, days: Vec<DailySummary>);
    fn set_theme(&mut self, theme: Theme);
}

pub trait ChartRenderer: Send + Sync {
    fn forecast_chart(&self, entries: &[ForecastEntry], units: UnitSystem) -> Result<()>;
    fn historical_chart(&self, series: &HistoricalSeries) -> Result<()>;
    fn set_theme(&self, theme: Theme) -> Result<()>;
}

pub trait WeatherAnimator: Send + Sync {
    fn start(&self, kind: AnimationKind) -> Result<()>;
}

/// Used when no chart backend is available
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCharts;

impl ChartRenderer for NoopCharts {
    fn forecast_chart(&self, _: &[ForecastEntry], _: UnitSystem) -> Result<()> {
        Ok(())
    }

    fn historical_chart(&self, _: &HistoricalSeries) -> Result<()> {
        Ok(())
    }

    fn set_theme(&self, _: Theme) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAnimator;

impl WeatherAnimator for NoopAnimator {
    fn start(&self, _: AnimationKind) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Element {
    text: Option<String>,
    indicator: Option<Indicator>,
    image: Option<(String, String)>,
    visible: bool,
}

/// In-memory display that renders to plain text
#[derive(Debug, Clone, PartialEq)]
pub struct TextDisplay {
    elements: BTreeMap<Field, Element>,
    hourly: Vec<HourlyItem>,
    daily: Vec<DailySummary>,
    theme: Theme,
}

impl TextDisplay {
    /// Every field bound
    #[must_use]
    pub fn full() -> Self {
        Self::with_fields(&Field::ALL)
    }

    /// Only the given fields bound. Overlays start hidden.
    #[must_use]
    pub fn with_fields(fields: &[Field]) -> Self {
        let elements = fields
            .iter()
            .map(|&field| {
                let hidden = matches!(field, Field::ErrorNotification | Field::LoadingOverlay);
                (
                    field,
                    Element {
                        visible: !hidden,
                        ..Element::default()
                    },
                )
            })
            .collect();
        Self {
            elements,
            hourly: Vec::new(),
            daily: Vec::new(),
            theme: Theme::default(),
        }
    }

    #[must_use]
    pub fn text(&self, field: Field) -> Option<&str> {
        self.elements.get(&field)?.text.as_deref()
    }

    #[must_use]
    pub fn indicator(&self, field: Field) -> Option<Indicator> {
        self.elements.get(&field)?.indicator
    }

    #[must_use]
    pub fn image(&self, field: Field) -> Option<(&str, &str)> {
        self.elements
            .get(&field)?
            .image
            .as_ref()
            .map(|(url, alt)| (url.as_str(), alt.as_str()))
    }

    #[must_use]
    pub fn is_visible(&self, field: Field) -> bool {
        self.elements.get(&field).is_some_and(|e| e.visible)
    }

    #[must_use]
    pub fn hourly(&self) -> &[HourlyItem] {
        &self.hourly
    }

    #[must_use]
    pub fn daily(&self) -> &[DailySummary] {
        &self.daily
    }

    #[must_use]
    pub fn theme(&self) -> Theme {
        self.theme
    }

    fn line(&self, out: &mut String, label: &str, field: Field) {
        if let Some(text) = self.text(field).filter(|t| !t.is_empty()) {
            match self.indicator(field) {
                Some(indicator) => {
                    let _ = writeln!(out, "{label:<12} {text} [{}]", indicator.as_str());
                }
                None => {
                    let _ = writeln!(out, "{label:<12} {text}");
                }
            }
        }
    }

    /// Plain-text dashboard
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();

        if self.is_visible(Field::ErrorNotification) {
            if let Some(message) = self.text(Field::ErrorMessage) {
                let _ = writeln!(out, "! {message}\n");
            }
        }

        if let Some(name) = self.text(Field::LocationName) {
            let _ = writeln!(out, "{name}");
        }
        for (label, field) in [
            ("Temperature", Field::CurrentTemp),
            ("", Field::FeelsLike),
            ("Conditions", Field::WeatherDescription),
            ("High", Field::HighTemp),
            ("Low", Field::LowTemp),
            ("Wind", Field::WindSpeed),
            ("Direction", Field::WindDirection),
            ("Humidity", Field::Humidity),
            ("Pressure", Field::Pressure),
            ("Air quality", Field::Aqi),
            ("UV index", Field::UvIndex),
            ("Sunrise", Field::SunriseTime),
            ("Sunset", Field::SunsetTime),
            ("Daylight", Field::SunPosition),
        ] {
            self.line(&mut out, label, field);
        }

        if !self.hourly.is_empty() {
            out.push_str("\nNext hours\n");
            for item in &self.hourly {
                let _ = writeln!(
                    out,
                    "  {}  {:>5}  {:>4}  {}",
                    item.time, item.temperature, item.humidity, item.description
                );
            }
        }

        if !self.daily.is_empty() {
            out.push_str("\nDaily\n");
            for day in &self.daily {
                let _ = writeln!(
                    out,
                    "  {:<6} {:<7} {:>4.0}° / {:>4.0}°  {:<12} rain {:>3}%  humidity {:.0}%",
                    day.label,
                    day.date_label,
                    day.high,
                    day.low,
                    day.dominant_condition,
                    day.precipitation_probability,
                    day.humidity
                );
            }
        }

        if let Some(alerts) = self.text(Field::WeatherAlerts) {
            let _ = writeln!(out, "\nAlerts\n{alerts}");
        }

        let mut advice = String::new();
        for (label, field) in [
            ("Health", Field::HealthWellnessRecommendation),
            ("Activity", Field::ActivityRecommendation),
            ("Sun", Field::UvRecommendation),
            ("Hydration", Field::WaterRecommendation),
            ("Food", Field::FoodRecommendation),
            ("Travel", Field::TravelRecommendation),
            ("Agriculture", Field::AgricultureRecommendation),
            ("Energy", Field::EnergyRecommendation),
        ] {
            self.line(&mut advice, label, field);
        }
        if !advice.is_empty() {
            out.push_str("\nRecommendations\n");
            out.push_str(&advice);
        }

        if let Some(panel) = self.text(Field::MeteorologicalData) {
            let _ = writeln!(out, "\n{panel}");
        }
        if let Some(updated) = self.text(Field::LastUpdated) {
            let _ = writeln!(out, "\n{updated}");
        }

        out
    }
}

impl DisplaySurface for TextDisplay {
    fn has(&self, field: Field) -> bool {
        self.elements.contains_key(&field)
    }

    fn set_text(&mut self, field: Field, text: &str) {
        if let Some(element) = self.elements.get_mut(&field) {
            element.text = Some(text.to_string());
        }
    }

    fn set_indicator(&mut self, field: Field, indicator: Indicator) {
        if let Some(element) = self.elements.get_mut(&field) {
            element.indicator = Some(indicator);
        }
    }

    fn set_image(&mut self, field: Field, url: &str, alt: &str) {
        if let Some(element) = self.elements.get_mut(&field) {
            element.image = Some((url.to_string(), alt.to_string()));
        }
    }

    fn set_visible(&mut self, field: Field, visible: bool) {
        if let Some(element) = self.elements.get_mut(&field) {
            element.visible = visible;
        }
    }

    fn set_hourly(&mut self, items: Vec<HourlyItem>) {
        self.hourly = items;
    }

    fn set_daily(&mut self, days: Vec<DailySummary>) {
        self.daily = days;
    }

    fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }
}

/// What one sync pass did
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SyncReport {
    pub written: Vec<Field>,
    pub skipped: Vec<Field>,
    pub failed_steps: Vec<&'static str>,
}

impl SyncReport {
    fn record(&mut self, step: &'static str, outcome: Result<()>) {
        if let Err(e) = outcome {
            warn!("{} update failed: {}", step, e);
            self.failed_steps.push(step);
        }
    }
}

pub struct UiSynchronizer {
    icon_base_url: String,
    offset: FixedOffset,
    user: UserPreferences,
    charts: Arc<dyn ChartRenderer>,
    animator: Arc<dyn WeatherAnimator>,
    simulation: Arc<dyn SimulatedDataProvider>,
}

impl UiSynchronizer {
    /// Synchronizer with no-op charts and animation, in the local time zone
    #[must_use]
    pub fn new(icon_base_url: &str, user: UserPreferences) -> Self {
        Self {
            icon_base_url: icon_base_url.trim_end_matches('/').to_string(),
            offset: *Local::now().offset(),
            user,
            charts: Arc::new(NoopCharts),
            animator: Arc::new(NoopAnimator),
            simulation: Arc::new(RandomSimulation::from_entropy()),
        }
    }

    #[must_use]
    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }

    #[must_use]
    pub fn with_charts(mut self, charts: Arc<dyn ChartRenderer>) -> Self {
        self.charts = charts;
        self
    }

    #[must_use]
    pub fn with_animator(mut self, animator: Arc<dyn WeatherAnimator>) -> Self {
        self.animator = animator;
        self
    }

    #[must_use]
    pub fn with_simulation(mut self, simulation: Arc<dyn SimulatedDataProvider>) -> Self {
        self.simulation = simulation;
        self
    }

    /// Offset used for every local time shown
    #[must_use]
    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    #[must_use]
    pub fn charts(&self) -> &dyn ChartRenderer {
        self.charts.as_ref()
    }

    #[must_use]
    pub fn user(&self) -> &UserPreferences {
        &self.user
    }

    fn icon_url(&self, icon: &str, large: bool) -> String {
        let scale = if large { "@2x" } else { "" };
        format!("{}/{icon}{scale}.png", self.icon_base_url)
    }

    fn local_time(&self, at: DateTime<Utc>, pattern: &str) -> String {
        at.with_timezone(&self.offset).format(pattern).to_string()
    }

    fn write<D: DisplaySurface + ?Sized>(
        display: &mut D,
        report: &mut SyncReport,
        field: Field,
        text: &str,
    ) {
        if display.has(field) {
            display.set_text(field, text);
            report.written.push(field);
        } else {
            report.skipped.push(field);
        }
    }

    /// Update every bound field from `snapshot`.
    ///
    /// Fails only when the snapshot lacks current weather or forecast.
    #[instrument(skip_all, fields(coordinates = %snapshot.coordinates))]
    pub fn sync<D: DisplaySurface + ?Sized>(
        &self,
        display: &mut D,
        snapshot: &FetchSnapshot,
        now: DateTime<Utc>,
    ) -> Result<SyncReport> {
        let (Some(current), Some(forecast)) = (&snapshot.payload.current, &snapshot.payload.forecast)
        else {
            error!("Invalid weather or forecast data");
            return Err(WeatherSenseError::render("Invalid weather or forecast data"));
        };
        let units = snapshot.unit_system;
        let uv = snapshot
            .payload
            .uv
            .unwrap_or(UvIndex::fallback(FALLBACK_UV_INDEX));

        let mut report = SyncReport::default();
        self.write_primary(display, &mut report, current, snapshot, uv);
        self.write_sun(display, &mut report, current, now);

        let days = aggregate_daily(forecast.upcoming(DAILY_SOURCE_ENTRIES), &self.offset);
        self.render_hourly(display, &mut report, forecast, units);
        Self::render_daily(display, &mut report, &days);
        report.record("forecast_chart", self.charts.forecast_chart(&forecast.entries, units));
        if let Some(historical) = &snapshot.payload.historical {
            report.record("historical_chart", self.charts.historical_chart(historical));
        }
        report.record(
            "animation",
            self.animator.start(AnimationKind::for_condition(&current.condition)),
        );
        self.render_recommendations(display, &mut report, snapshot, current, uv, &days);
        self.render_simulated(display, &mut report, snapshot, now);

        Self::write(
            display,
            &mut report,
            Field::LastUpdated,
            &format!("Last updated: {}", self.local_time(now, "%H:%M:%S")),
        );

        debug!(
            "Synced {} fields, skipped {}, {} failed steps",
            report.written.len(),
            report.skipped.len(),
            report.failed_steps.len()
        );
        Ok(report)
    }

    fn write_primary<D: DisplaySurface + ?Sized>(
        &self,
        display: &mut D,
        report: &mut SyncReport,
        current: &CurrentWeather,
        snapshot: &FetchSnapshot,
        uv: UvIndex,
    ) {
        let units = snapshot.unit_system;

        Self::write(display, report, Field::LocationName, &current.location_name);
        Self::write(display, report, Field::CurrentTemp, &units.format_temperature(current.temperature));
        Self::write(
            display,
            report,
            Field::FeelsLike,
            &format!("Feels like: {}", units.format_temperature(current.feels_like)),
        );
        Self::write(display, report, Field::WeatherDescription, &current.description);
        Self::write(
            display,
            report,
            Field::WindSpeed,
            &format!("{:.2} km/h", units.wind_speed_kmh(current.wind_speed)),
        );
        if let Some(degrees) = current.wind_direction {
            Self::write(
                display,
                report,
                Field::WindDirection,
                &format!("{} ({degrees}°)", CurrentWeather::wind_direction_to_cardinal(degrees)),
            );
        }
        Self::write(display, report, Field::Humidity, &format!("{}%", current.humidity));
        Self::write(display, report, Field::Pressure, &format!("{:.0} hPa", current.pressure));

        if let Some(air) = snapshot.payload.air_quality {
            Self::write(display, report, Field::Aqi, air.description());
            if display.has(Field::Aqi) {
                display.set_indicator(Field::Aqi, Indicator::for_aqi(air.aqi));
            }
        }

        Self::write(display, report, Field::UvIndex, &uv.display_value());
        if display.has(Field::UvIndex) {
            display.set_indicator(Field::UvIndex, Indicator::for_uv(uv.value));
        }

        if display.has(Field::HighTemp) && display.has(Field::LowTemp) {
            Self::write(
                display,
                report,
                Field::HighTemp,
                &format!("H: {}°", current.temp_max.round() as i64),
            );
            Self::write(
                display,
                report,
                Field::LowTemp,
                &format!("L: {}°", current.temp_min.round() as i64),
            );
        } else {
            report.skipped.extend([Field::HighTemp, Field::LowTemp]);
        }

        if display.has(Field::WeatherIcon) {
            display.set_image(
                Field::WeatherIcon,
                &self.icon_url(&current.icon, true),
                &current.description,
            );
            report.written.push(Field::WeatherIcon);
        } else {
            report.skipped.push(Field::WeatherIcon);
        }
    }

    fn write_sun<D: DisplaySurface + ?Sized>(
        &self,
        display: &mut D,
        report: &mut SyncReport,
        current: &CurrentWeather,
        now: DateTime<Utc>,
    ) {
        Self::write(
            display,
            report,
            Field::LocationTime,
            &format!("Local time: {}", self.local_time(now, "%H:%M")),
        );

        let (Some(sunrise), Some(sunset)) = (current.sunrise, current.sunset) else {
            warn!("Missing sunrise/sunset data for sun position");
            return;
        };
        Self::write(display, report, Field::SunriseTime, &self.local_time(sunrise, "%H:%M"));
        Self::write(display, report, Field::SunsetTime, &self.local_time(sunset, "%H:%M"));
        if let Some(position) = current.sun_position(now) {
            Self::write(display, report, Field::SunPosition, &format!("{position:.0}%"));
        }
    }

    fn render_hourly<D: DisplaySurface + ?Sized>(
        &self,
        display: &mut D,
        report: &mut SyncReport,
        forecast: &Forecast,
        units: UnitSystem,
    ) {
        if !display.has(Field::HourlyForecast) {
            report.skipped.push(Field::HourlyForecast);
            return;
        }
        let items = forecast
            .upcoming(HOURLY_ENTRIES)
            .iter()
            .map(|entry| HourlyItem {
                time: self.local_time(entry.timestamp, "%H:00"),
                temperature: units.format_temperature(entry.temperature),
                humidity: format!("{}%", entry.humidity),
                icon_url: self.icon_url(&entry.icon, false),
                description: entry.description.clone(),
            })
            .collect();
        display.set_hourly(items);
        report.written.push(Field::HourlyForecast);
    }

    fn render_daily<D: DisplaySurface + ?Sized>(
        display: &mut D,
        report: &mut SyncReport,
        days: &[DailySummary],
    ) {
        if display.has(Field::DailyForecast) {
            display.set_daily(days.to_vec());
            report.written.push(Field::DailyForecast);
        } else {
            report.skipped.push(Field::DailyForecast);
        }
    }

    fn render_recommendations<D: DisplaySurface + ?Sized>(
        &self,
        display: &mut D,
        report: &mut SyncReport,
        snapshot: &FetchSnapshot,
        current: &CurrentWeather,
        uv: UvIndex,
        days: &[DailySummary],
    ) {
        let units = snapshot.unit_system;
        let temp = units.to_celsius(current.temperature);
        let condition = current.condition.as_str();
        let aqi = snapshot.payload.air_quality.map_or(0, |air| air.aqi);
        let user = &self.user;

        let texts = [
            (
                Field::HealthWellnessRecommendation,
                recommendations::health_wellness(temp, condition, uv.value, aqi, user),
            ),
            (
                Field::ActivityRecommendation,
                recommendations::activity(temp, condition, aqi, user),
            ),
            (Field::UvRecommendation, recommendations::uv(uv.value, user)),
            (Field::WaterRecommendation, recommendations::water(temp, condition, user)),
            (Field::FoodRecommendation, recommendations::food(temp, condition)),
            (
                Field::TravelRecommendation,
                recommendations::travel(temp, condition, uv.value, user),
            ),
            (
                Field::AgricultureRecommendation,
                format!(
                    "{} Growing degree days over the next {} days: {:.1}",
                    recommendations::agriculture_advice(
                        temp,
                        condition,
                        f64::from(current.humidity),
                        user
                    ),
                    days.len(),
                    recommendations::growing_degree_days(days, units)
                ),
            ),
            (
                Field::EnergyRecommendation,
                recommendations::energy_advice(temp, condition, user),
            ),
            (Field::WeatherAlerts, Self::alerts_text(days, units)),
        ];
        for (field, text) in texts {
            Self::write(display, report, field, &text);
        }
    }

    fn alerts_text(days: &[DailySummary], units: UnitSystem) -> String {
        let alerts = recommendations::severe_weather_alerts(days, units);
        if alerts.is_empty() {
            return "No severe weather expected.".to_string();
        }
        alerts
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn render_simulated<D: DisplaySurface + ?Sized>(
        &self,
        display: &mut D,
        report: &mut SyncReport,
        snapshot: &FetchSnapshot,
        now: DateTime<Utc>,
    ) {
        if !display.has(Field::MeteorologicalData) {
            report.skipped.push(Field::MeteorologicalData);
            return;
        }
        let panel = SimulatedPanel::build(self.simulation.as_ref(), snapshot.coordinates, now);
        Self::write(display, report, Field::MeteorologicalData, &panel.lines().join("\n"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::tests::{sample_current, sample_forecast};
    use crate::models::{AirQuality, Coordinates, SnapshotPayload};
    use chrono::TimeZone;
    use rstest::rstest;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn snapshot(units: UnitSystem, uv: Option<UvIndex>) -> FetchSnapshot {
        FetchSnapshot::new(
            now(),
            Coordinates::new(40.7, -74.0),
            units,
            SnapshotPayload {
                current: Some(sample_current(units)),
                forecast: Some(sample_forecast()),
                air_quality: Some(AirQuality { aqi: 4, pm2_5: None }),
                uv,
                historical: None,
            },
        )
    }

    fn synchronizer() -> UiSynchronizer {
        UiSynchronizer::new(DEFAULT_ICON_BASE_URL, UserPreferences::default())
            .with_offset(FixedOffset::east_opt(0).unwrap())
            .with_simulation(Arc::new(RandomSimulation::seeded(1)))
    }

    struct FailingCharts {
        calls: AtomicUsize,
    }

    impl ChartRenderer for FailingCharts {
        fn forecast_chart(&self, _: &[ForecastEntry], _: UnitSystem) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(WeatherSenseError::render("canvas missing"))
        }

        fn historical_chart(&self, _: &HistoricalSeries) -> Result<()> {
            Err(WeatherSenseError::render("canvas missing"))
        }

        fn set_theme(&self, _: Theme) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_primary_fields_formatting() {
        let mut display = TextDisplay::full();
        synchronizer()
            .sync(&mut display, &snapshot(UnitSystem::Metric, Some(UvIndex::measured(6.34))), now())
            .unwrap();

        assert_eq!(display.text(Field::LocationName), Some("New York"));
        assert_eq!(display.text(Field::CurrentTemp), Some("22°C"));
        assert_eq!(display.text(Field::FeelsLike), Some("Feels like: 21°C"));
        assert_eq!(display.text(Field::WeatherDescription), Some("clear sky"));
        assert_eq!(display.text(Field::WindSpeed), Some("10.80 km/h"));
        assert_eq!(display.text(Field::Humidity), Some("60%"));
        assert_eq!(display.text(Field::HighTemp), Some("H: 25°"));
        assert_eq!(display.text(Field::LowTemp), Some("L: 18°"));
        assert_eq!(display.text(Field::Aqi), Some("Poor"));
        assert_eq!(display.indicator(Field::Aqi), Some(Indicator::Poor));
        assert_eq!(display.text(Field::UvIndex), Some("6.3"));
        assert_eq!(display.indicator(Field::UvIndex), Some(Indicator::Poor));
        assert_eq!(
            display.image(Field::WeatherIcon),
            Some(("https://openweathermap.org/img/wn/01d@2x.png", "clear sky"))
        );
    }

    #[test]
    fn test_imperial_wind_and_suffix() {
        let mut display = TextDisplay::full();
        synchronizer()
            .sync(&mut display, &snapshot(UnitSystem::Imperial, None), now())
            .unwrap();
        assert_eq!(display.text(Field::CurrentTemp), Some("72°F"));
        assert_eq!(display.text(Field::WindSpeed), Some("4.83 km/h"));
        assert_eq!(display.text(Field::UvIndex), Some("N/A"));
        assert_eq!(display.indicator(Field::UvIndex), Some(Indicator::Good));
    }

    #[test]
    fn test_missing_fields_are_skipped() {
        let mut display = TextDisplay::with_fields(&[
            Field::LocationName,
            Field::CurrentTemp,
            Field::HighTemp,
        ]);
        let report = synchronizer()
            .sync(&mut display, &snapshot(UnitSystem::Metric, None), now())
            .unwrap();

        assert_eq!(display.text(Field::LocationName), Some("New York"));
        assert_eq!(display.text(Field::HighTemp), None);
        assert!(report.skipped.contains(&Field::HighTemp));
        assert!(report.skipped.contains(&Field::Humidity));
        assert!(report.failed_steps.is_empty());
    }

    #[test]
    fn test_downstream_failure_is_isolated() {
        let charts = Arc::new(FailingCharts {
            calls: AtomicUsize::new(0),
        });
        let sync = synchronizer().with_charts(charts.clone());
        let mut display = TextDisplay::full();

        let report = sync
            .sync(&mut display, &snapshot(UnitSystem::Metric, None), now())
            .unwrap();

        assert_eq!(report.failed_steps, vec!["forecast_chart"]);
        assert_eq!(charts.calls.load(Ordering::SeqCst), 1);
        assert_eq!(display.hourly().len(), HOURLY_ENTRIES);
        assert_eq!(display.daily().len(), 3);
        assert!(display.text(Field::HealthWellnessRecommendation).is_some());
        assert!(display.text(Field::MeteorologicalData).unwrap().contains("(simulated)"));
    }

    #[test]
    fn test_list_renderers_are_recorded() {
        let mut display = TextDisplay::full();
        let report = synchronizer()
            .sync(&mut display, &snapshot(UnitSystem::Metric, None), now())
            .unwrap();
        assert!(report.written.contains(&Field::HourlyForecast));
        assert!(report.written.contains(&Field::DailyForecast));
        assert!(report.failed_steps.is_empty());

        let mut bare = TextDisplay::with_fields(&[Field::LocationName]);
        let report = synchronizer()
            .sync(&mut bare, &snapshot(UnitSystem::Metric, None), now())
            .unwrap();
        assert!(report.skipped.contains(&Field::HourlyForecast));
        assert!(report.skipped.contains(&Field::DailyForecast));
        assert!(bare.hourly().is_empty());
    }

    #[test]
    fn test_agriculture_energy_and_quiet_alerts() {
        let mut display = TextDisplay::full();
        synchronizer()
            .sync(&mut display, &snapshot(UnitSystem::Metric, None), now())
            .unwrap();

        // three days of 15-22 °C
        let agriculture = display.text(Field::AgricultureRecommendation).unwrap();
        assert!(agriculture.starts_with("Current conditions are generally favorable"));
        assert!(agriculture.ends_with("Growing degree days over the next 3 days: 25.5"));
        assert!(
            display
                .text(Field::EnergyRecommendation)
                .unwrap()
                .starts_with("Take advantage of natural light")
        );
        assert_eq!(display.text(Field::WeatherAlerts), Some("No severe weather expected."));
        let text = display.render();
        assert!(text.contains("Agriculture"));
        assert!(text.contains("Alerts\nNo severe weather expected."));
    }

    #[test]
    fn test_severe_forecast_raises_alerts() {
        let mut hot = snapshot(UnitSystem::Metric, None);
        if let Some(forecast) = hot.payload.forecast.as_mut() {
            for entry in &mut forecast.entries {
                entry.temperature = 37.0;
                entry.wind_speed = 8.0;
            }
        }
        let mut display = TextDisplay::full();
        synchronizer().sync(&mut display, &hot, now()).unwrap();

        let alerts = display.text(Field::WeatherAlerts).unwrap();
        assert_eq!(alerts.lines().count(), 6);
        assert!(alerts.starts_with("Heat Advisory (Moderate) Jun 1: High temperature of 37°C expected"));
        assert!(alerts.contains("Wind Advisory (Moderate) Jun 1: Strong winds of 29 km/h expected"));
    }

    #[test]
    fn test_hourly_items() {
        let mut display = TextDisplay::full();
        synchronizer()
            .sync(&mut display, &snapshot(UnitSystem::Metric, None), now())
            .unwrap();

        let first = &display.hourly()[0];
        assert_eq!(first.time, "00:00");
        assert_eq!(first.temperature, "15°C");
        assert_eq!(first.icon_url, "https://openweathermap.org/img/wn/01d.png");
        assert_eq!(display.hourly()[1].time, "03:00");
    }

    #[test]
    fn test_sun_times() {
        let mut display = TextDisplay::full();
        synchronizer()
            .sync(&mut display, &snapshot(UnitSystem::Metric, None), now())
            .unwrap();
        assert_eq!(display.text(Field::SunriseTime), Some("09:30"));
        assert_eq!(display.text(Field::SunsetTime), Some("00:30"));
        assert_eq!(display.text(Field::SunPosition), Some("17%"));
        assert_eq!(display.text(Field::LastUpdated), Some("Last updated: 12:00:00"));
    }

    #[test]
    fn test_snapshot_without_forecast_is_rejected() {
        let mut incomplete = snapshot(UnitSystem::Metric, None);
        incomplete.payload.forecast = None;
        let mut display = TextDisplay::full();

        let err = synchronizer().sync(&mut display, &incomplete, now()).unwrap_err();
        assert!(matches!(err, WeatherSenseError::Render { .. }));
        assert_eq!(display.text(Field::LocationName), None);
    }

    #[rstest]
    #[case(1, Indicator::Good)]
    #[case(2, Indicator::Good)]
    #[case(3, Indicator::Moderate)]
    #[case(4, Indicator::Poor)]
    #[case(5, Indicator::Bad)]
    fn test_aqi_indicator(#[case] aqi: u8, #[case] expected: Indicator) {
        assert_eq!(Indicator::for_aqi(aqi), expected);
    }

    #[rstest]
    #[case(0.0, Indicator::Good)]
    #[case(2.9, Indicator::Good)]
    #[case(3.0, Indicator::Moderate)]
    #[case(7.9, Indicator::Poor)]
    #[case(8.0, Indicator::Bad)]
    fn test_uv_indicator(#[case] uv: f64, #[case] expected: Indicator) {
        assert_eq!(Indicator::for_uv(uv), expected);
    }

    #[rstest]
    #[case("Rain", AnimationKind::Rain)]
    #[case("Drizzle", AnimationKind::Rain)]
    #[case("Snow", AnimationKind::Snow)]
    #[case("Clouds", AnimationKind::Cloudy)]
    #[case("Thunderstorm", AnimationKind::Thunder)]
    #[case("Mist", AnimationKind::Clear)]
    fn test_animation_kind(#[case] condition: &str, #[case] expected: AnimationKind) {
        assert_eq!(AnimationKind::for_condition(condition), expected);
    }

    #[test]
    fn test_render_contains_headline() {
        let mut display = TextDisplay::full();
        synchronizer()
            .sync(&mut display, &snapshot(UnitSystem::Metric, None), now())
            .unwrap();
        let text = display.render();
        assert!(text.starts_with("New York\n"));
        assert!(text.contains("22°C"));
        assert!(text.contains("Recommendations"));
    }
}
