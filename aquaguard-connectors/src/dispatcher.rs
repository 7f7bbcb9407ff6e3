//! Notification Dispatcher
//!
//! Pushes accepted critical alerts to every configured channel. Warnings are
//! kept in the cycle report but never leave the system.
//!
//! Channels are driven concurrently on a [`JoinSet`], each under its own
//! timeout. The dispatcher never fails: every channel's outcome is logged,
//! counted in [`DeliveryStats`] and returned as a [`DeliveryOutcome`].

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use aquaguard_core::{constants::time::DEFAULT_CHANNEL_TIMEOUT_SECS, Alert, Timestamp};
use serde::Serialize;
use tokio::task::JoinSet;

use crate::{ChannelError, DeliveryStats, Notification, NotificationChannel};

/// How one channel delivery ended
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "reason")]
pub enum DeliveryStatus {
    Sent,
    Failed(String),
    TimedOut,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveryOutcome {
    pub channel: String,
    /// Message of the notification
    pub message: String,
    #[serde(flatten)]
    pub status: DeliveryStatus,
}

impl DeliveryOutcome {
    pub fn is_sent(&self) -> bool {
        self.status == DeliveryStatus::Sent
    }
}

/// Fans notifications out to channels
pub struct NotificationDispatcher {
    channels: Vec<Arc<dyn NotificationChannel>>,
    timeout: Duration,
    stats: Mutex<DeliveryStats>,
}

impl Default for NotificationDispatcher {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_CHANNEL_TIMEOUT_SECS))
    }
}

impl std::fmt::Debug for NotificationDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.channels.iter().map(|c| c.name()).collect();
        f.debug_struct("NotificationDispatcher")
            .field("channels", &names)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl NotificationDispatcher {
    /// Dispatcher without channels; `timeout` bounds each channel delivery
    pub fn new(timeout: Duration) -> Self {
        Self {
            channels: Vec::new(),
            timeout,
            stats: Mutex::new(DeliveryStats::default()),
        }
    }

    pub fn with_channel(mut self, channel: impl NotificationChannel + 'static) -> Self {
        self.add_channel(Arc::new(channel));
        self
    }

    pub fn add_channel(&mut self, channel: Arc<dyn NotificationChannel>) {
        self.channels.push(channel);
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Deliver an accepted alert; anything below critical is skipped
    pub async fn dispatch(&self, alert: &Alert, recommendations: &[&str]) -> Vec<DeliveryOutcome> {
        if !alert.is_critical() {
            log::debug!("Not pushing {} alert for {}", alert.level.name(), alert.sensor);
            return Vec::new();
        }
        self.deliver(Notification::from_alert(alert, recommendations)).await
    }

    /// Send an `info` test message through every channel
    pub async fn send_test(&self, timestamp: Timestamp) -> Vec<DeliveryOutcome> {
        log::info!("Sending test notifications to {} channel(s)", self.channels.len());
        self.deliver(Notification::test(timestamp)).await
    }

    /// Deliver to all channels concurrently; outcomes come back in channel order
    pub async fn deliver(&self, notification: Notification) -> Vec<DeliveryOutcome> {
        let notification = Arc::new(notification);
        let mut tasks = JoinSet::new();

        for (index, channel) in self.channels.iter().enumerate() {
            let channel = Arc::clone(channel);
            let notification = Arc::clone(&notification);
            let timeout = self.timeout;
            tasks.spawn(async move {
                let result = match tokio::time::timeout(timeout, channel.send(&notification)).await {
                    Ok(result) => result,
                    Err(_) => Err(ChannelError::Timeout(timeout)),
                };
                (index, result)
            });
        }

        let mut finished = Vec::with_capacity(self.channels.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(entry) => finished.push(entry),
                Err(e) => log::error!("Notification task failed: {e}"),
            }
        }
        finished.sort_by_key(|(index, _)| *index);

        finished
            .into_iter()
            .map(|(index, result)| self.record(self.channels[index].name(), &notification.message, result))
            .collect()
    }

    pub fn stats(&self) -> DeliveryStats {
        self.lock_stats().clone()
    }

    fn record(&self, channel: &str, message: &str, result: Result<(), ChannelError>) -> DeliveryOutcome {
        let mut stats = self.lock_stats();
        let status = match result {
            Ok(()) => {
                log::info!("{channel} notification sent: {message}");
                stats.sent += 1;
                DeliveryStatus::Sent
            }
            Err(ChannelError::Timeout(after)) => {
                log::error!("{channel} notification timed out after {after:?}: {message}");
                stats.timed_out += 1;
                stats.last_error = Some(format!("{channel}: timed out"));
                DeliveryStatus::TimedOut
            }
            Err(e) => {
                log::error!("Error sending {channel} notification: {e}");
                stats.failed += 1;
                stats.last_error = Some(format!("{channel}: {e}"));
                DeliveryStatus::Failed(e.to_string())
            }
        };

        DeliveryOutcome {
            channel: channel.to_string(),
            message: message.to_string(),
            status,
        }
    }

    fn lock_stats(&self) -> MutexGuard<'_, DeliveryStats> {
        self.stats.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
