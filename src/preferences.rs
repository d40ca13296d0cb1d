//! Persisted unit, theme and last-location preferences
//!
//! State changes apply in memory first and are then written through to the
//! [`PreferenceStore`] when one is attached.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use tracing::{debug, info};

use crate::Result;
use crate::models::{Location, UnitSystem};
use crate::storage::PreferenceStore;

const THEME_KEY: &str = "theme";
const UNITS_KEY: &str = "units";
const LAST_LOCATION_KEY: &str = "last_location";
const LAST_THEME_CHANGE_KEY: &str = "last_theme_change";
const ALL_KEYS: [&str; 4] = [THEME_KEY, UNITS_KEY, LAST_LOCATION_KEY, LAST_THEME_CHANGE_KEY];

/// Auto-switching is suppressed for this long after any theme change
const THEME_HOLD_HOURS: i64 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    #[must_use]
    pub fn toggled(&self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Icon for the toggle, showing the theme it switches to
    #[must_use]
    pub fn toggle_icon(&self) -> &'static str {
        match self {
            Theme::Light => "🌙",
            Theme::Dark => "☀️",
        }
    }

    /// Light from 06:00 through 18:59 local time, dark otherwise
    #[must_use]
    pub fn for_local_hour(hour: u32) -> Self {
        if (6..=18).contains(&hour) {
            Theme::Light
        } else {
            Theme::Dark
        }
    }
}

pub struct Preferences {
    store: Option<PreferenceStore>,
    theme: Theme,
    units: UnitSystem,
    last_location: Option<Location>,
    last_theme_change: Option<DateTime<Utc>>,
}

impl Preferences {
    /// Defaults with nothing persisted
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            store: None,
            theme: Theme::default(),
            units: UnitSystem::default(),
            last_location: None,
            last_theme_change: None,
        }
    }

    /// Read stored preferences. Without a stored theme the system hint decides and is saved.
    pub async fn load(store: PreferenceStore, prefers_dark: bool, now: DateTime<Utc>) -> Result<Self> {
        let stored_theme: Option<Theme> = store.get(THEME_KEY).await?;
        let units: Option<UnitSystem> = store.get(UNITS_KEY).await?;
        let last_location: Option<Location> = store.get(LAST_LOCATION_KEY).await?;
        let last_theme_change: Option<DateTime<Utc>> = store.get(LAST_THEME_CHANGE_KEY).await?;

        let mut preferences = Self {
            store: Some(store),
            theme: stored_theme.unwrap_or_default(),
            units: units.unwrap_or_default(),
            last_location,
            last_theme_change,
        };

        if stored_theme.is_none() {
            let initial = if prefers_dark { Theme::Dark } else { Theme::Light };
            debug!("No stored theme, starting with {}", initial.as_str());
            preferences.set_theme(initial, now).await?;
        }

        Ok(preferences)
    }

    async fn persist<T: Serialize + Debug + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        match &self.store {
            Some(store) => store.put(key, value).await,
            None => Ok(()),
        }
    }

    #[must_use]
    pub fn theme(&self) -> Theme {
        self.theme
    }

    #[must_use]
    pub fn units(&self) -> UnitSystem {
        self.units
    }

    #[must_use]
    pub fn last_location(&self) -> Option<&Location> {
        self.last_location.as_ref()
    }

    #[must_use]
    pub fn last_theme_change(&self) -> Option<DateTime<Utc>> {
        self.last_theme_change
    }

    /// Apply a theme and record when it changed
    pub async fn set_theme(&mut self, theme: Theme, now: DateTime<Utc>) -> Result<()> {
        self.theme = theme;
        self.last_theme_change = Some(now);
        self.persist(THEME_KEY, &theme).await?;
        self.persist(LAST_THEME_CHANGE_KEY, &now).await
    }

    pub async fn toggle_theme(&mut self, now: DateTime<Utc>) -> Result<Theme> {
        let next = self.theme.toggled();
        self.set_theme(next, now).await?;
        Ok(next)
    }

    /// Switch to the time-of-day theme unless the theme changed in the last 24 hours.
    ///
    /// Returns the new theme when a switch happened.
    pub async fn update_theme_for_time(
        &mut self,
        now: DateTime<Utc>,
        local_hour: u32,
    ) -> Result<Option<Theme>> {
        let held = self
            .last_theme_change
            .is_some_and(|changed| now - changed <= Duration::hours(THEME_HOLD_HOURS));
        if held {
            return Ok(None);
        }

        let theme = Theme::for_local_hour(local_hour);
        info!("Auto-switching theme to {}", theme.as_str());
        self.set_theme(theme, now).await?;
        Ok(Some(theme))
    }

    pub async fn toggle_units(&mut self) -> Result<UnitSystem> {
        self.units = self.units.toggled();
        self.persist(UNITS_KEY, &self.units).await?;
        Ok(self.units)
    }

    pub async fn remember_location(&mut self, location: Location) -> Result<()> {
        self.persist(LAST_LOCATION_KEY, &location).await?;
        self.last_location = Some(location);
        Ok(())
    }

    /// Forget every saved preference and return to defaults
    pub async fn reset(&mut self) -> Result<()> {
        if let Some(store) = &self.store {
            for key in ALL_KEYS {
                store.remove(key).await?;
            }
        }
        self.theme = Theme::default();
        self.units = UnitSystem::default();
        self.last_location = None;
        self.last_theme_change = None;
        info!("Preferences reset to defaults");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[rstest]
    #[case(5, Theme::Dark)]
    #[case(6, Theme::Light)]
    #[case(18, Theme::Light)]
    #[case(19, Theme::Dark)]
    fn test_theme_for_local_hour(#[case] hour: u32, #[case] expected: Theme) {
        assert_eq!(Theme::for_local_hour(hour), expected);
    }

    #[tokio::test]
    async fn test_first_load_uses_system_hint_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferenceStore::open(dir.path()).unwrap();
        let preferences = Preferences::load(store, true, noon()).await.unwrap();

        assert_eq!(preferences.theme(), Theme::Dark);
        assert_eq!(preferences.last_theme_change(), Some(noon()));
        assert_eq!(preferences.units(), UnitSystem::Metric);
        assert!(preferences.last_location().is_none());
    }

    #[tokio::test]
    async fn test_toggles_are_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferenceStore::open(dir.path()).unwrap();
        let mut preferences = Preferences::load(store, false, noon()).await.unwrap();

        assert_eq!(preferences.toggle_units().await.unwrap(), UnitSystem::Imperial);
        assert_eq!(preferences.toggle_theme(noon()).await.unwrap(), Theme::Dark);
        preferences
            .remember_location(Location::new(40.7, -74.0, "New York".to_string()))
            .await
            .unwrap();

        let store = preferences.store.as_ref().unwrap();
        assert_eq!(store.get::<UnitSystem>(UNITS_KEY).await.unwrap(), Some(UnitSystem::Imperial));
        assert_eq!(store.get::<Theme>(THEME_KEY).await.unwrap(), Some(Theme::Dark));
        let saved: Option<Location> = store.get(LAST_LOCATION_KEY).await.unwrap();
        assert_eq!(saved.map(|l| l.name), Some("New York".to_string()));
    }

    #[tokio::test]
    async fn test_reset_clears_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferenceStore::open(dir.path()).unwrap();
        let mut preferences = Preferences::load(store, true, noon()).await.unwrap();
        preferences.toggle_units().await.unwrap();
        preferences
            .remember_location(Location::new(40.7, -74.0, "New York".to_string()))
            .await
            .unwrap();

        preferences.reset().await.unwrap();

        assert_eq!(preferences.theme(), Theme::Light);
        assert_eq!(preferences.units(), UnitSystem::Metric);
        assert!(preferences.last_location().is_none());
        assert!(preferences.last_theme_change().is_none());
        let store = preferences.store.as_ref().unwrap();
        assert_eq!(store.get::<Theme>(THEME_KEY).await.unwrap(), None);
        assert_eq!(store.get::<UnitSystem>(UNITS_KEY).await.unwrap(), None);
        assert_eq!(store.get::<Location>(LAST_LOCATION_KEY).await.unwrap(), None);
        let changed: Option<DateTime<Utc>> = store.get(LAST_THEME_CHANGE_KEY).await.unwrap();
        assert_eq!(changed, None);
    }

    #[tokio::test]
    async fn test_auto_theme_held_for_a_day_after_change() {
        let mut preferences = Preferences::in_memory();
        preferences.set_theme(Theme::Dark, noon()).await.unwrap();

        let switched = preferences
            .update_theme_for_time(noon() + Duration::hours(3), 15)
            .await
            .unwrap();
        assert_eq!(switched, None);
        assert_eq!(preferences.theme(), Theme::Dark);

        let switched = preferences
            .update_theme_for_time(noon() + Duration::hours(25), 13)
            .await
            .unwrap();
        assert_eq!(switched, Some(Theme::Light));
        assert_eq!(preferences.last_theme_change(), Some(noon() + Duration::hours(25)));
    }

    #[tokio::test]
    async fn test_auto_theme_without_history_switches() {
        let mut preferences = Preferences::in_memory();
        let switched = preferences.update_theme_for_time(noon(), 22).await.unwrap();
        assert_eq!(switched, Some(Theme::Dark));
    }
}
