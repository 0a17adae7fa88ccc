//! Transient, auto-dismissing status notifications.
//!
//! The engine never blocks on a notification; sinks must return immediately.

use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

impl NotificationLevel {
    /// How long a notification of this level stays visible.
    pub fn auto_dismiss(self) -> Duration {
        match self {
            NotificationLevel::Info => Duration::from_millis(2000),
            NotificationLevel::Success => Duration::from_millis(3000),
            NotificationLevel::Error => Duration::from_millis(4000),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    /// Stable machine-readable code, e.g. `EXPORT_STARTED` or `VALIDATION_ERROR`.
    pub code: &'static str,
    pub message: String,
    pub auto_dismiss: Duration,
}

impl Notification {
    pub fn new(level: NotificationLevel, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            level,
            code,
            message: message.into(),
            auto_dismiss: level.auto_dismiss(),
        }
    }

    pub fn info(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Info, code, message)
    }

    pub fn success(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Success, code, message)
    }

    pub fn error(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Error, code, message)
    }
}

/// Receives notifications emitted by the editor session and the export engine.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the log. Used by the binary, where there is no UI.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn notify(&self, n: Notification) {
        match n.level {
            NotificationLevel::Error => error!(code = n.code, "{}", n.message),
            NotificationLevel::Info | NotificationLevel::Success => {
                info!(code = n.code, "{}", n.message)
            }
        }
    }
}

/// Forwards notifications over an unbounded channel to whatever displays them.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl NotificationSink for ChannelSink {
    fn notify(&self, notification: Notification) {
        // A closed receiver means nobody is displaying notifications any more.
        let _ = self.tx.send(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_have_increasing_dismiss_times() {
        assert!(NotificationLevel::Info.auto_dismiss() < NotificationLevel::Success.auto_dismiss());
        assert!(
            NotificationLevel::Success.auto_dismiss() < NotificationLevel::Error.auto_dismiss()
        );
    }

    #[tokio::test]
    async fn test_channel_sink_delivers_in_order() {
        let (sink, mut rx) = ChannelSink::new();
        sink.notify(Notification::info("A", "first"));
        sink.notify(Notification::success("B", "second"));
        assert_eq!(rx.recv().await.unwrap().code, "A");
        let second = rx.recv().await.unwrap();
        assert_eq!(second.code, "B");
        assert_eq!(second.auto_dismiss, Duration::from_millis(3000));
    }

    #[test]
    fn test_channel_sink_ignores_closed_receiver() {
        let (sink, rx) = ChannelSink::new();
        drop(rx);
        sink.notify(Notification::error("C", "nobody listening"));
    }
}
