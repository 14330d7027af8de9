//! Notification display capability.

use async_trait::async_trait;
use tokio::sync::Mutex;

use shellcache_core::{Error, Notification, Notifier};

/// Shows notifications as structured log events.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn show(&self, notification: &Notification) -> Result<(), Error> {
        tracing::info!(
            title = %notification.title,
            body = %notification.body,
            icon = notification.icon.as_deref(),
            badge = notification.badge.as_deref(),
            "notification"
        );
        Ok(())
    }
}

/// Keeps every notification it is asked to show.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    shown: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn shown(&self) -> Vec<Notification> {
        self.shown.lock().await.clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn show(&self, notification: &Notification) -> Result<(), Error> {
        self.shown.lock().await.push(notification.clone());
        Ok(())
    }
}
