//! Single-slot freshness cache for fetch snapshots
//!
//! A snapshot is reused only for the exact same coordinates and unit system
//! while it is younger than the TTL. Any other request replaces the slot.

use chrono::Duration;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info};

use crate::Result;
use crate::clock::Clock;
use crate::models::{Coordinates, FetchSnapshot, UnitSystem};

/// Default reuse window, 10 minutes
pub const DEFAULT_TTL_SECONDS: i64 = 600;

pub struct FreshnessCache {
    slot: Option<FetchSnapshot>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl FreshnessCache {
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_ttl(clock, Duration::seconds(DEFAULT_TTL_SECONDS))
    }

    #[must_use]
    pub fn with_ttl(clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            slot: None,
            ttl,
            clock,
        }
    }

    /// Whether the slot can answer a request for this key right now
    #[must_use]
    pub fn is_fresh_for(&self, coordinates: Coordinates, unit_system: UnitSystem) -> bool {
        self.slot.as_ref().is_some_and(|cached| {
            cached.matches(coordinates, unit_system)
                && self.clock.now() - cached.timestamp < self.ttl
        })
    }

    /// Return the cached snapshot when fresh, otherwise run `fetch` and install its result.
    ///
    /// On fetch failure the previous slot is left untouched and the error propagates.
    #[tracing::instrument(name = "freshness_cache", level = "debug", skip_all, fields(coordinates = %coordinates, units = %unit_system))]
    pub async fn get_or_fetch<F, Fut>(
        &mut self,
        coordinates: Coordinates,
        unit_system: UnitSystem,
        fetch: F,
    ) -> Result<FetchSnapshot>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<FetchSnapshot>>,
    {
        if self.is_fresh_for(coordinates, unit_system) {
            if let Some(cached) = &self.slot {
                debug!("Snapshot found and still fresh");
                return Ok(cached.clone());
            }
        }

        debug!("Snapshot missing, stale or for another key; fetching");
        let mut snapshot = fetch().await?;
        snapshot.timestamp = self.clock.now();
        info!("Installed new snapshot for {}", snapshot.coordinates);
        self.slot = Some(snapshot.clone());
        Ok(snapshot)
    }

    /// The current slot, fresh or not
    #[must_use]
    pub fn peek(&self) -> Option<&FetchSnapshot> {
        self.slot.as_ref()
    }

    pub fn invalidate(&mut self) {
        self.slot = None;
    }
}
