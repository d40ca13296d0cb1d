//! Sliding-window request limiter

use std::time::{Duration, Instant};

/// Allows at most `max_requests` within any `window`
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    /// Request timestamps within the current window
    request_times: Vec<Instant>,
}

impl RateLimiter {
    /// Create a new rate limiter
    #[must_use]
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            request_times: Vec::new(),
        }
    }

    /// Check if a request at `now` is allowed and record it
    pub fn allow_request(&mut self, now: Instant) -> bool {
        self.cleanup_old_requests(now);

        if self.request_times.len() >= self.max_requests {
            false
        } else {
            self.request_times.push(now);
            true
        }
    }

    /// Get time until next request is allowed
    pub fn time_until_next_request(&mut self, now: Instant) -> Duration {
        self.cleanup_old_requests(now);

        if self.request_times.len() < self.max_requests {
            return Duration::ZERO;
        }
        match self.request_times.first() {
            Some(oldest) => self.window.saturating_sub(now.duration_since(*oldest)),
            None => Duration::ZERO,
        }
    }

    /// Drop requests that left the window
    fn cleanup_old_requests(&mut self, now: Instant) {
        let window = self.window;
        self.request_times
            .retain(|&time| now.duration_since(time) < window);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limiter() {
        let start = Instant::now();
        let mut limiter = RateLimiter::new(2, Duration::from_secs(60));

        assert!(limiter.allow_request(start));
        assert!(limiter.allow_request(start + Duration::from_secs(1)));
        assert!(!limiter.allow_request(start + Duration::from_secs(2)));
        assert_eq!(
            limiter.time_until_next_request(start + Duration::from_secs(10)),
            Duration::from_secs(50)
        );
    }

    #[test]
    fn test_window_slides() {
        let start = Instant::now();
        let mut limiter = RateLimiter::new(1, Duration::from_secs(60));

        assert!(limiter.allow_request(start));
        assert!(!limiter.allow_request(start + Duration::from_secs(59)));
        assert!(limiter.allow_request(start + Duration::from_secs(60)));
        assert_eq!(
            limiter.time_until_next_request(start + Duration::from_secs(61)),
            Duration::from_secs(59)
        );
    }
}
