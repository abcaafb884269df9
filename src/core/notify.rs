//! User-visible notifications.
//!
//! The workflow queues notifications; the presentation layer decides how to
//! surface them (status bar, stdout, desktop).

use std::fmt;

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    /// Something completed successfully
    Success,
    /// Something failed
    Error,
}

impl NotificationLevel {
    /// Short label for display.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Success => "ok",
            Self::Error => "error",
        }
    }
}

/// A user-visible notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Severity
    pub level: NotificationLevel,
    /// Short title
    pub title: String,
    /// Human-readable message
    pub message: String,
}

impl Notification {
    /// Create a success notification.
    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self { level: NotificationLevel::Success, title: title.into(), message: message.into() }
    }

    /// Create an error notification.
    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self { level: NotificationLevel::Error, title: title.into(), message: message.into() }
    }

    /// Whether this notification reports a failure.
    pub fn is_error(&self) -> bool {
        self.level == NotificationLevel::Error
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.message)
    }
}

/// Raise a desktop notification.
#[cfg(feature = "notifications")]
pub fn send_desktop_notification(notification: &Notification) {
    let icon = match notification.level {
        NotificationLevel::Success => "dialog-information",
        NotificationLevel::Error => "dialog-error",
    };

    if let Err(e) = notify_rust::Notification::new()
        .summary(&format!("Brandpost: {}", notification.title))
        .body(&notification.message)
        .icon(icon)
        .appname("brandpost")
        .timeout(5000)
        .show()
    {
        tracing::debug!(error = %e, "Desktop notification failed");
    }
}

/// No-op notification when feature is disabled.
#[cfg(not(feature = "notifications"))]
pub fn send_desktop_notification(_notification: &Notification) {}
