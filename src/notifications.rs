//! Dismissible notification with auto-hide

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, error, info};

pub const DEFAULT_AUTO_HIDE_SECONDS: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    pub shown_at: DateTime<Utc>,
}

/// Holds at most one notification; showing a new one replaces the old
#[derive(Debug, Clone)]
pub struct NotificationCenter {
    auto_hide: Duration,
    current: Option<Notification>,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(Duration::seconds(DEFAULT_AUTO_HIDE_SECONDS))
    }
}

impl NotificationCenter {
    #[must_use]
    pub fn new(auto_hide: Duration) -> Self {
        Self {
            auto_hide,
            current: None,
        }
    }

    pub fn show(&mut self, kind: NotificationKind, message: impl Into<String>, now: DateTime<Utc>) {
        let message = message.into();
        match kind {
            NotificationKind::Error => error!("Error: {}", message),
            NotificationKind::Info => info!("{}", message),
        }
        self.current = Some(Notification {
            kind,
            message,
            shown_at: now,
        });
    }

    pub fn error(&mut self, message: impl Into<String>, now: DateTime<Utc>) {
        self.show(NotificationKind::Error, message, now);
    }

    pub fn dismiss(&mut self) {
        self.current = None;
    }

    /// Hide the notification once it has been shown for the auto-hide period.
    ///
    /// Returns true when something was hidden.
    pub fn tick(&mut self, now: DateTime<Utc>) -> bool {
        let expired = self
            .current
            .as_ref()
            .is_some_and(|n| now - n.shown_at >= self.auto_hide);
        if expired {
            debug!("Auto-hiding notification");
            self.current = None;
        }
        expired
    }

    /// The visible notification, if any, at `now`
    #[must_use]
    pub fn active(&self, now: DateTime<Utc>) -> Option<&Notification> {
        self.current
            .as_ref()
            .filter(|n| now - n.shown_at < self.auto_hide)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_auto_hide_after_five_seconds() {
        let mut center = NotificationCenter::default();
        center.error("Failed to fetch weather data: timeout", t0());

        assert!(center.active(t0() + Duration::seconds(4)).is_some());
        assert!(!center.tick(t0() + Duration::seconds(4)));
        assert!(center.active(t0() + Duration::seconds(5)).is_none());
        assert!(center.tick(t0() + Duration::seconds(5)));
        assert!(!center.tick(t0() + Duration::seconds(6)));
    }

    #[test]
    fn test_new_notification_replaces_old() {
        let mut center = NotificationCenter::default();
        center.error("first", t0());
        center.show(NotificationKind::Info, "second", t0() + Duration::seconds(3));

        let active = center.active(t0() + Duration::seconds(6)).unwrap();
        assert_eq!(active.message, "second");
        assert_eq!(active.kind, NotificationKind::Info);
    }

    #[test]
    fn test_dismiss_is_idempotent() {
        let mut center = NotificationCenter::default();
        center.error("boom", t0());
        center.dismiss();
        center.dismiss();
        assert!(center.active(t0()).is_none());
    }
}
