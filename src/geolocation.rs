//! One-shot device position lookup with timeout and rate limiting

use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

use crate::config::GeolocationConfig;
use crate::error::GeolocationError;
use crate::models::Coordinates;
use crate::rate_limit::RateLimiter;

/// Requests allowed per [`RATE_LIMIT_WINDOW`]
pub const RATE_LIMIT_REQUESTS: usize = 100;
pub const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(60);
/// Fixed wait for a position fix
pub const POSITION_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
    /// Oldest cached position the provider may return
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: POSITION_TIMEOUT,
            maximum_age: Duration::ZERO,
        }
    }
}

impl From<&GeolocationConfig> for PositionOptions {
    fn from(config: &GeolocationConfig) -> Self {
        Self {
            high_accuracy: config.high_accuracy,
            ..Self::default()
        }
    }
}

#[async_trait]
pub trait PositionProvider: Send + Sync {
    async fn current_position(
        &self,
        options: &PositionOptions,
    ) -> Result<Coordinates, GeolocationError>;
}

/// Reports the home location from configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfiguredPosition {
    home: Option<Coordinates>,
}

impl ConfiguredPosition {
    #[must_use]
    pub fn new(home: Option<Coordinates>) -> Self {
        Self { home }
    }
}

#[async_trait]
impl PositionProvider for ConfiguredPosition {
    async fn current_position(&self, _: &PositionOptions) -> Result<Coordinates, GeolocationError> {
        self.home.ok_or(GeolocationError::PositionUnavailable)
    }
}

pub struct Geolocator {
    provider: Option<Arc<dyn PositionProvider>>,
    options: PositionOptions,
    limiter: RateLimiter,
}

impl Geolocator {
    /// `None` means the platform has no position source
    #[must_use]
    pub fn new(provider: Option<Arc<dyn PositionProvider>>, options: PositionOptions) -> Self {
        Self {
            provider,
            options,
            limiter: RateLimiter::new(RATE_LIMIT_REQUESTS, RATE_LIMIT_WINDOW),
        }
    }

    #[must_use]
    pub fn is_supported(&self) -> bool {
        self.provider.is_some()
    }

    /// Ask the provider for the current position once
    #[instrument(skip(self))]
    pub async fn locate(&mut self) -> Result<Coordinates, GeolocationError> {
        let Some(provider) = &self.provider else {
            warn!("No position provider available");
            return Err(GeolocationError::Unsupported);
        };

        let now = Instant::now();
        if !self.limiter.allow_request(now) {
            let wait = self.limiter.time_until_next_request(now);
            warn!("Geolocation rate limit exceeded, retry in {:.1}s", wait.as_secs_f64());
            return Err(GeolocationError::RateLimited {
                retry_after_secs: wait.as_secs().max(1),
            });
        }

        debug!(
            "Requesting position (high accuracy: {}, timeout: {}s)",
            self.options.high_accuracy,
            self.options.timeout.as_secs()
        );
        let request_start = Instant::now();
        let position = tokio::time::timeout(self.options.timeout, provider.current_position(&self.options))
            .await
            .map_err(|_| {
                warn!("Position request timed out after {}s", self.options.timeout.as_secs());
                GeolocationError::Timeout
            })??;

        info!(
            "Located at {} in {:.3}s",
            position,
            request_start.elapsed().as_secs_f64()
        );
        Ok(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SlowProvider;

    #[async_trait]
    impl PositionProvider for SlowProvider {
        async fn current_position(&self, _: &PositionOptions) -> Result<Coordinates, GeolocationError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(Coordinates::new(0.0, 0.0))
        }
    }

    struct DeniedProvider;

    #[async_trait]
    impl PositionProvider for DeniedProvider {
        async fn current_position(&self, _: &PositionOptions) -> Result<Coordinates, GeolocationError> {
            Err(GeolocationError::PermissionDenied)
        }
    }

    fn locator(provider: impl PositionProvider + 'static) -> Geolocator {
        Geolocator::new(Some(Arc::new(provider)), PositionOptions::default())
    }

    #[test]
    fn test_default_options() {
        let options = PositionOptions::default();
        assert!(options.high_accuracy);
        assert_eq!(options.timeout, Duration::from_secs(10));
        assert_eq!(options.maximum_age, Duration::ZERO);
    }

    #[test]
    fn test_config_keeps_fixed_timeout() {
        let config = GeolocationConfig {
            high_accuracy: false,
            ..GeolocationConfig::default()
        };
        let options = PositionOptions::from(&config);
        assert!(!options.high_accuracy);
        assert_eq!(options.timeout, POSITION_TIMEOUT);
        assert_eq!(POSITION_TIMEOUT, Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_configured_home_position() {
        let home = Coordinates::new(47.37, 8.54);
        let mut geolocator = locator(ConfiguredPosition::new(Some(home)));
        assert_eq!(geolocator.locate().await.unwrap(), home);

        let mut geolocator = locator(ConfiguredPosition::new(None));
        assert_eq!(geolocator.locate().await, Err(GeolocationError::PositionUnavailable));
    }

    #[tokio::test]
    async fn test_missing_provider_is_unsupported() {
        let mut geolocator = Geolocator::new(None, PositionOptions::default());
        assert!(!geolocator.is_supported());
        assert_eq!(geolocator.locate().await, Err(GeolocationError::Unsupported));
    }

    #[tokio::test]
    async fn test_provider_error_passes_through() {
        let mut geolocator = locator(DeniedProvider);
        assert_eq!(geolocator.locate().await, Err(GeolocationError::PermissionDenied));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_provider_times_out() {
        let mut geolocator = locator(SlowProvider);
        assert_eq!(geolocator.locate().await, Err(GeolocationError::Timeout));
    }

    #[tokio::test]
    async fn test_rate_limited_after_window_is_full() {
        let mut geolocator = locator(ConfiguredPosition::new(Some(Coordinates::new(1.0, 1.0))));
        for _ in 0..RATE_LIMIT_REQUESTS {
            assert!(geolocator.locate().await.is_ok());
        }
        match geolocator.locate().await {
            Err(GeolocationError::RateLimited { retry_after_secs }) => {
                assert!((1..=60).contains(&retry_after_secs));
            }
            other => panic!("expected rate limit, got {other:?}"),
        }
    }
}
