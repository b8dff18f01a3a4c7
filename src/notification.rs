use std::time::{Duration, Instant};

pub const ERROR_TITLE: &str = "Error";
pub const ERROR_MESSAGE: &str = "Failed to get response from the bot.";
pub const DEFAULT_DURATION: Duration = Duration::from_millis(3000);

/// A short-lived notice shown over the chat. It never touches history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: &'static str,
    pub message: &'static str,
    pub raised_at: Instant,
    pub duration: Duration,
}

impl Notification {
    pub fn reply_failed(raised_at: Instant, duration: Duration) -> Self {
        Self {
            title: ERROR_TITLE,
            message: ERROR_MESSAGE,
            raised_at,
            duration,
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.raised_at) >= self.duration
    }

    /// Fraction of the display time left, for the countdown bar
    pub fn remaining_ratio(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return 0.0;
        }
        let elapsed = now.saturating_duration_since(self.raised_at);
        1.0 - (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }
}

/// Queue of visible notifications, newest last
#[derive(Debug)]
pub struct Toasts {
    items: Vec<Notification>,
    duration: Duration,
}

impl Default for Toasts {
    fn default() -> Self {
        Self::new(DEFAULT_DURATION)
    }
}

impl Toasts {
    pub fn new(duration: Duration) -> Self {
        Self {
            items: Vec::new(),
            duration,
        }
    }

    /// Raise the fixed reply-failure notice
    pub fn push_reply_failed(&mut self) -> Notification {
        let notification = Notification::reply_failed(Instant::now(), self.duration);
        self.items.push(notification.clone());
        notification
    }

    /// User closed the newest notice before it timed out
    pub fn dismiss(&mut self) -> Option<Notification> {
        self.items.pop()
    }

    pub fn expire(&mut self, now: Instant) {
        self.items.retain(|n| !n.is_expired(now));
    }

    pub fn current(&self) -> Option<&Notification> {
        self.items.last()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_failed_has_fixed_text() {
        let mut toasts = Toasts::default();
        let n = toasts.push_reply_failed();
        assert_eq!(n.title, "Error");
        assert_eq!(n.message, "Failed to get response from the bot.");
        assert_eq!(n.duration, Duration::from_millis(3000));
    }

    #[test]
    fn test_expire_drops_elapsed_only() {
        let mut toasts = Toasts::new(Duration::from_millis(100));
        let n = toasts.push_reply_failed();

        toasts.expire(n.raised_at + Duration::from_millis(50));
        assert_eq!(toasts.len(), 1);

        toasts.expire(n.raised_at + Duration::from_millis(100));
        assert!(toasts.is_empty());
    }

    #[test]
    fn test_dismiss_before_timeout() {
        let mut toasts = Toasts::default();
        toasts.push_reply_failed();
        toasts.push_reply_failed();
        assert!(toasts.dismiss().is_some());
        assert_eq!(toasts.len(), 1);
        assert!(toasts.dismiss().is_some());
        assert!(toasts.dismiss().is_none());
        assert!(toasts.current().is_none());
    }

    #[test]
    fn test_remaining_ratio_counts_down() {
        let n = Notification::reply_failed(Instant::now(), Duration::from_secs(2));
        assert!((n.remaining_ratio(n.raised_at) - 1.0).abs() < 0.0001);
        assert!((n.remaining_ratio(n.raised_at + Duration::from_secs(1)) - 0.5).abs() < 0.0001);
        assert_eq!(n.remaining_ratio(n.raised_at + Duration::from_secs(5)), 0.0);
    }
}
