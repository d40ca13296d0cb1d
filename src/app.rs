//! Application context and event handlers
//!
//! [`AppContext`] owns every piece of mutable dashboard state. Each user
//! event is one async method; failures are shown through the notification
//! area and also returned so a caller can react.

use chrono::{DateTime, Duration, Timelike, Utc};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::api::{LocationQuery, WeatherSource};
use crate::clock::{Clock, SystemClock};
use crate::config::WeatherSenseConfig;
use crate::error::GeolocationError;
use crate::fetch::{FetchOrchestrator, HistoricalGenerator};
use crate::freshness::FreshnessCache;
use crate::geolocation::{ConfiguredPosition, Geolocator, PositionOptions};
use crate::models::{Coordinates, Location};
use crate::notifications::{NotificationCenter, NotificationKind};
use crate::preferences::{Preferences, Theme};
use crate::sync::{DEFAULT_ICON_BASE_URL, DisplaySurface, Field, TextDisplay, UiSynchronizer};
use crate::{Result, WeatherSenseError};

/// Fields without which the dashboard cannot start
pub const CRITICAL_FIELDS: [Field; 6] = [
    Field::LocationName,
    Field::CurrentTemp,
    Field::WeatherDescription,
    Field::SearchButton,
    Field::LocationSearch,
    Field::LoadingOverlay,
];

pub const OFFLINE_MESSAGE: &str = "You are offline. Weather data may not be current.";

/// How often `tick` re-evaluates the time-of-day theme
const THEME_CHECK_INTERVAL_HOURS: i64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Recommendations,
    Forecast,
    Insights,
}

impl Tab {
    #[must_use]
    pub fn id(&self) -> &'static str {
        match self {
            Tab::Recommendations => "recommendations",
            Tab::Forecast => "forecast",
            Tab::Insights => "insights",
        }
    }
}

pub struct AppContext<D: DisplaySurface = TextDisplay> {
    display: D,
    preferences: Preferences,
    source: Arc<dyn WeatherSource>,
    orchestrator: FetchOrchestrator,
    cache: FreshnessCache,
    synchronizer: UiSynchronizer,
    geolocator: Geolocator,
    notifications: NotificationCenter,
    clock: Arc<dyn Clock>,
    last_coordinates: Option<Coordinates>,
    last_theme_check: Option<DateTime<Utc>>,
    online: bool,
    active_tab: Tab,
}

impl<D: DisplaySurface> AppContext<D> {
    /// Context with default collaborators: no-op charts, no position provider,
    /// 600 s cache and 5 s notifications
    pub fn new(
        source: Arc<dyn WeatherSource>,
        display: D,
        preferences: Preferences,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            display,
            preferences,
            orchestrator: FetchOrchestrator::new(
                source.clone(),
                HistoricalGenerator::from_entropy(),
                clock.clone(),
            ),
            source,
            cache: FreshnessCache::new(clock.clone()),
            synchronizer: UiSynchronizer::new(DEFAULT_ICON_BASE_URL, Default::default()),
            geolocator: Geolocator::new(None, PositionOptions::default()),
            notifications: NotificationCenter::default(),
            clock,
            last_coordinates: None,
            last_theme_check: None,
            online: true,
            active_tab: Tab::default(),
        }
    }

    /// Context wired from configuration, reading the system clock
    pub fn from_config(
        config: &WeatherSenseConfig,
        source: Arc<dyn WeatherSource>,
        display: D,
        preferences: Preferences,
    ) -> Self {
        let position = ConfiguredPosition::new(config.geolocation.home());
        Self::new(source, display, preferences, Arc::new(SystemClock))
            .with_cache_ttl(Duration::seconds(config.cache.ttl_seconds.into()))
            .with_notifications(NotificationCenter::new(Duration::seconds(
                config.notifications.auto_hide_seconds.into(),
            )))
            .with_synchronizer(UiSynchronizer::new(
                &config.weather.icon_base_url,
                config.user.clone(),
            ))
            .with_geolocator(Geolocator::new(
                Some(Arc::new(position)),
                PositionOptions::from(&config.geolocation),
            ))
    }

    #[must_use]
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache = FreshnessCache::with_ttl(self.clock.clone(), ttl);
        self
    }

    #[must_use]
    pub fn with_synchronizer(mut self, synchronizer: UiSynchronizer) -> Self {
        self.synchronizer = synchronizer;
        self
    }

    #[must_use]
    pub fn with_geolocator(mut self, geolocator: Geolocator) -> Self {
        self.geolocator = geolocator;
        self
    }

    #[must_use]
    pub fn with_notifications(mut self, notifications: NotificationCenter) -> Self {
        self.notifications = notifications;
        self
    }

    #[must_use]
    pub fn with_history(mut self, history: HistoricalGenerator) -> Self {
        self.orchestrator = FetchOrchestrator::new(self.source.clone(), history, self.clock.clone());
        self
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn cache(&self) -> &FreshnessCache {
        &self.cache
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    pub fn last_coordinates(&self) -> Option<Coordinates> {
        self.last_coordinates
    }

    pub fn is_online(&self) -> bool {
        self.online
    }

    pub fn active_tab(&self) -> Tab {
        self.active_tab
    }

    fn local_hour(&self, at: DateTime<Utc>) -> u32 {
        at.with_timezone(&self.synchronizer.offset()).hour()
    }

    /// Show an error in the notification area and hand it back
    fn surface(&mut self, err: WeatherSenseError) -> WeatherSenseError {
        let message = err.user_message();
        self.notifications.error(message.as_str(), self.clock.now());
        self.display.set_text(Field::ErrorMessage, &message);
        self.display.set_visible(Field::ErrorNotification, true);
        err
    }

    fn set_loading(&mut self, loading: bool) {
        self.display.set_visible(Field::LoadingOverlay, loading);
    }

    fn apply_theme(&mut self, theme: Theme) {
        self.display.set_theme(theme);
        self.display.set_text(Field::ThemeToggle, theme.toggle_icon());
        if let Err(e) = self.synchronizer.charts().set_theme(theme) {
            warn!("Chart theme update failed: {}", e);
        }
    }

    fn show_units(&mut self) {
        let label = self.preferences.units().toggle_label();
        self.display.set_text(Field::UnitsToggle, label);
    }

    /// Check critical fields, apply saved preferences and load the first location.
    ///
    /// Missing critical fields are fatal and reported once.
    #[instrument(skip(self))]
    pub async fn initialize(&mut self) -> Result<()> {
        let missing: Vec<String> = CRITICAL_FIELDS
            .iter()
            .filter(|field| !self.display.has(**field))
            .map(|field| field.id().to_string())
            .collect();
        if !missing.is_empty() {
            error!("Missing critical display fields: {}", missing.join(", "));
            return Err(self.surface(WeatherSenseError::Initialization { missing }));
        }

        self.apply_theme(self.preferences.theme());
        self.show_units();
        self.select_tab(self.active_tab);
        self.update_theme_for_time().await;

        match self.preferences.last_location().cloned() {
            Some(location) => {
                info!("Restoring last location {}", location.display_name());
                self.load_weather(location.coordinates).await
            }
            None => self.use_current_location().await,
        }
    }

    async fn update_theme_for_time(&mut self) {
        let now = self.clock.now();
        let hour = self.local_hour(now);
        self.last_theme_check = Some(now);
        match self.preferences.update_theme_for_time(now, hour).await {
            Ok(Some(theme)) => self.apply_theme(theme),
            Ok(None) => {}
            Err(e) => warn!("Could not persist automatic theme: {}", e),
        }
    }

    /// Fetch (or reuse) weather for `coordinates` in the current units and show it
    #[instrument(skip_all, fields(coordinates = %coordinates))]
    pub async fn load_weather(&mut self, coordinates: Coordinates) -> Result<()> {
        self.set_loading(true);
        let outcome = self.fetch_and_sync(coordinates).await;
        self.set_loading(false);
        outcome.map_err(|e| self.surface(e))
    }

    async fn fetch_and_sync(&mut self, coordinates: Coordinates) -> Result<()> {
        let units = self.preferences.units();
        let orchestrator = &self.orchestrator;
        let snapshot = self
            .cache
            .get_or_fetch(coordinates, units, || orchestrator.fetch(coordinates, units))
            .await?;
        self.last_coordinates = Some(coordinates);

        self.synchronizer
            .sync(&mut self.display, &snapshot, self.clock.now())?;

        if let Some(current) = &snapshot.payload.current {
            let location = Location::new(
                coordinates.latitude,
                coordinates.longitude,
                current.location_name.clone(),
            );
            if let Err(e) = self.preferences.remember_location(location).await {
                warn!("Could not save last location: {}", e);
            }
        }
        Ok(())
    }

    /// Search by place name or "lat,lon"
    #[instrument(skip(self))]
    pub async fn search(&mut self, input: &str) -> Result<()> {
        let query = LocationQuery::parse(input).map_err(|e| self.surface(e))?;
        let coordinates = match query {
            LocationQuery::Coordinates(coordinates) => coordinates,
            LocationQuery::Name(name) => match self.source.geocode(&name).await {
                Ok(Some(location)) => {
                    info!("Found {}", location.display_name());
                    location.coordinates
                }
                Ok(None) => return Err(self.surface(WeatherSenseError::geocoding_not_found(name))),
                Err(e) => return Err(self.surface(e.into_network())),
            },
        };
        self.load_weather(coordinates).await
    }

    /// Locate the device and load weather there
    #[instrument(skip(self))]
    pub async fn use_current_location(&mut self) -> Result<()> {
        if !self.geolocator.is_supported() {
            warn!("No position source on this device");
            return Err(self.surface(GeolocationError::Unsupported.into()));
        }
        self.set_loading(true);
        let located = self.geolocator.locate().await;
        self.set_loading(false);
        match located {
            Ok(coordinates) => self.load_weather(coordinates).await,
            Err(e) => {
                warn!("Geolocation failed: {}", e);
                Err(self.surface(e.into()))
            }
        }
    }

    pub async fn toggle_theme(&mut self) -> Result<Theme> {
        let theme = self.preferences.toggle_theme(self.clock.now()).await?;
        self.apply_theme(theme);
        Ok(theme)
    }

    /// Flip units and reload the last location in the new units
    pub async fn toggle_units(&mut self) -> Result<()> {
        let units = self.preferences.toggle_units().await?;
        info!("Units switched to {}", units);
        self.show_units();
        match self.last_coordinates {
            Some(coordinates) => self.load_weather(coordinates).await,
            None => Ok(()),
        }
    }

    /// Reload the last shown or saved location, still subject to the cache,
    /// or locate the device
    pub async fn refresh(&mut self) -> Result<()> {
        let saved = self.preferences.last_location().map(|l| l.coordinates);
        match self.last_coordinates.or(saved) {
            Some(coordinates) => self.load_weather(coordinates).await,
            None => self.use_current_location().await,
        }
    }

    pub async fn go_online(&mut self) -> Result<()> {
        self.online = true;
        match self.last_coordinates {
            Some(coordinates) => self.load_weather(coordinates).await,
            None => Ok(()),
        }
    }

    pub fn go_offline(&mut self) {
        self.online = false;
        let now = self.clock.now();
        self.notifications.show(NotificationKind::Error, OFFLINE_MESSAGE, now);
        self.display.set_text(Field::ErrorMessage, OFFLINE_MESSAGE);
        self.display.set_visible(Field::ErrorNotification, true);
    }

    pub fn close_error(&mut self) {
        self.notifications.dismiss();
        self.display.set_visible(Field::ErrorNotification, false);
    }

    /// Periodic housekeeping: auto-hide notifications, hourly theme check
    pub async fn tick(&mut self) {
        let now = self.clock.now();
        self.notifications.tick(now);
        let showing = self.notifications.active(now).is_some();
        self.display.set_visible(Field::ErrorNotification, showing);
        let due = self
            .last_theme_check
            .is_none_or(|checked| now - checked >= Duration::hours(THEME_CHECK_INTERVAL_HOURS));
        if due {
            self.update_theme_for_time().await;
        }
    }

    pub fn select_tab(&mut self, tab: Tab) {
        self.active_tab = tab;
        self.display.set_text(Field::ActiveTab, tab.id());
    }
}
