//! Transient user notifications ("toasts").
//!
//! Stores report every success/failure through a `Notifier`; the UI drains
//! the receiving end of the channel. A detached notifier only logs.

use std::sync::mpsc::{self, Receiver, Sender};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct Notifier {
    tx: Option<Sender<Notification>>,
}

impl Notifier {
    /// Create a notifier and the receiver the UI reads from.
    pub fn channel() -> (Self, Receiver<Notification>) {
        let (tx, rx) = mpsc::channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// Notifier with no listener.
    pub fn detached() -> Self {
        Self { tx: None }
    }

    pub fn success(&self, message: impl Into<String>) {
        self.send(NotificationLevel::Success, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.send(NotificationLevel::Error, message.into());
    }

    pub fn info(&self, message: impl Into<String>) {
        self.send(NotificationLevel::Info, message.into());
    }

    fn send(&self, level: NotificationLevel, message: String) {
        tracing::debug!(?level, "Notification: {}", message);
        if let Some(tx) = &self.tx {
            // The UI may have gone away; notifications are fire-and-forget.
            let _ = tx.send(Notification { level, message });
        }
    }
}
