//! Fake channels and source fixtures for the connector integration tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use aquaguard_connectors::{ChannelError, Notification, NotificationChannel};
use aquaguard_core::{constants::MS_PER_HOUR, MemorySource, Timestamp};

/// Start of every fixture timeline
pub const T0: Timestamp = 1_700_000_000_000;

/// Records every notification it is given
#[derive(Clone, Default)]
pub struct RecordingChannel {
    pub received: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.received.lock().unwrap().len()
    }

    pub fn last(&self) -> Option<Notification> {
        self.received.lock().unwrap().last().cloned()
    }
}

#[async_trait::async_trait]
impl NotificationChannel for RecordingChannel {
    fn name(&self) -> &str {
        "recording"
    }

    async fn send(&self, notification: &Notification) -> Result<(), ChannelError> {
        self.received.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

/// Always answers with a server error
pub struct FailingChannel;

#[async_trait::async_trait]
impl NotificationChannel for FailingChannel {
    fn name(&self) -> &str {
        "failing"
    }

    async fn send(&self, _notification: &Notification) -> Result<(), ChannelError> {
        Err(ChannelError::Status {
            status: 503,
            message: "provider down".to_string(),
        })
    }
}

/// Never answers within any sensible budget
pub struct HangingChannel;

#[async_trait::async_trait]
impl NotificationChannel for HangingChannel {
    fn name(&self) -> &str {
        "hanging"
    }

    async fn send(&self, _notification: &Notification) -> Result<(), ChannelError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(())
    }
}

/// Record hourly `values` so the last one lands exactly at `now`
pub fn record_hourly(source: &MemorySource, parameter: &str, now: Timestamp, values: &[f64]) {
    let span = (values.len().saturating_sub(1)) as u64 * MS_PER_HOUR;
    source.record_series(parameter, now - span, MS_PER_HOUR, values);
}

/// `count` values on the line `start + slope * hour`
pub fn linear(start: f64, slope_per_hour: f64, count: usize) -> Vec<f64> {
    (0..count).map(|i| start + slope_per_hour * i as f64).collect()
}
