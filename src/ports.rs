//! Platform capabilities injected into the core.
//!
//! Clipboard, notifications and analytics are never reached as globals; the
//! host passes an implementation of each port.

use crate::error::Result;
use arboard::Clipboard;
use std::sync::{Arc, Mutex};

/// Something that can receive text for copy/paste.
pub trait ClipboardPort: Send + Sync {
    /// Copy text to the clipboard.
    fn copy(&self, text: &str) -> Result<()>;
}

/// The system clipboard.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl ClipboardPort for SystemClipboard {
    fn copy(&self, text: &str) -> Result<()> {
        let mut clipboard = Clipboard::new()?;
        clipboard.set_text(text)?;
        Ok(())
    }
}

/// Severity of a user-visible notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    /// Informational.
    Info,
    /// Something degraded.
    Warning,
    /// Something failed.
    Error,
}

/// A user-visible message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Severity.
    pub level: NotificationLevel,
    /// Text shown to the user.
    pub message: String,
}

/// Sink for user-visible notifications.
pub trait NotificationPort: Send + Sync {
    /// Show a notification.
    fn notify(&self, level: NotificationLevel, message: &str);
}

/// Notifications kept in memory for the host to display.
#[derive(Debug, Default, Clone)]
pub struct NotificationLog {
    entries: Arc<Mutex<Vec<Notification>>>,
}

impl NotificationLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent notification.
    pub fn latest(&self) -> Option<Notification> {
        self.entries.lock().ok()?.last().cloned()
    }

    /// Remove and return every notification.
    pub fn drain(&self) -> Vec<Notification> {
        match self.entries.lock() {
            Ok(mut entries) => std::mem::take(&mut *entries),
            Err(_) => Vec::new(),
        }
    }
}

impl NotificationPort for NotificationLog {
    fn notify(&self, level: NotificationLevel, message: &str) {
        match level {
            NotificationLevel::Error => tracing::error!("{}", message),
            NotificationLevel::Warning => tracing::warn!("{}", message),
            NotificationLevel::Info => tracing::info!("{}", message),
        }
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(Notification {
                level,
                message: message.to_string(),
            });
        }
    }
}

/// Sink for usage events.
pub trait AnalyticsPort: Send + Sync {
    /// Record an event.
    fn track(&self, category: &str, action: &str, name: &str);
}

/// Analytics that only emits `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAnalytics;

impl AnalyticsPort for TracingAnalytics {
    fn track(&self, category: &str, action: &str, name: &str) {
        tracing::info!(target: "analytics", category, action, name, "event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn notification_log_keeps_order() {
        let log = NotificationLog::new();
        log.notify(NotificationLevel::Info, "first");
        log.notify(NotificationLevel::Error, "second");

        assert_eq!(log.latest().unwrap().message, "second");
        let drained = log.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].level, NotificationLevel::Info);
        assert!(log.latest().is_none());
    }
}
