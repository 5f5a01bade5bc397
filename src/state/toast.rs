// Transient notifications shown in the status bar.

use std::time::{Duration, Instant};

/// How long a toast stays up unless told otherwise.
pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
    pub shown_at: Instant,
    pub duration: Duration,
}

impl Toast {
    pub fn new(level: ToastLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            shown_at: Instant::now(),
            duration: DEFAULT_TOAST_DURATION,
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) >= self.duration
    }
}

/// Holds at most one toast; a newer one replaces the current one.
#[derive(Debug, Default)]
pub struct Toasts {
    current: Option<Toast>,
}

impl Toasts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, toast: Toast) {
        self.current = Some(toast);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.show(Toast::new(ToastLevel::Info, message));
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.show(Toast::new(ToastLevel::Success, message));
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.show(Toast::new(ToastLevel::Warning, message));
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.show(Toast::new(ToastLevel::Error, message));
    }

    /// Drop the current toast once it has been up long enough.
    pub fn tick(&mut self, now: Instant) {
        if self.current.as_ref().is_some_and(|t| t.is_expired_at(now)) {
            self.current = None;
        }
    }

    pub fn current(&self) -> Option<&Toast> {
        self.current.as_ref()
    }

    pub fn dismiss(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newest_toast_replaces_previous() {
        let mut toasts = Toasts::new();
        toasts.info("loading");
        toasts.error("failed");

        let current = toasts.current().unwrap();
        assert_eq!(current.level, ToastLevel::Error);
        assert_eq!(current.message, "failed");
    }

    #[test]
    fn test_tick_expires_toast() {
        let mut toasts = Toasts::new();
        toasts.show(Toast::new(ToastLevel::Success, "done").with_duration(Duration::from_secs(2)));
        let shown_at = toasts.current().unwrap().shown_at;

        toasts.tick(shown_at + Duration::from_secs(1));
        assert!(toasts.current().is_some());

        toasts.tick(shown_at + Duration::from_secs(2));
        assert!(toasts.current().is_none());
    }
}
