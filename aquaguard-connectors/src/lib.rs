//! Notification Channels and the Monitoring Cycle
//!
//! ## Overview
//!
//! The analysis engine decides *whether* someone must be told; this crate
//! decides *how*. It holds the outbound channels (email and SMS, both over
//! HTTP APIs), the dispatcher that fans a notification out to them, and the
//! [`Monitor`](monitor::Monitor) that runs one complete cycle:
//!
//! ```text
//! ReadingSource ──► readings ──► trends ──► alerts ──► cooldown gate ──► dispatcher ──► channels
//!                                  │                                         (critical only)
//!                                  └──► summary, correlation, holistic ──► AnalysisReport
//! ```
//!
//! ## Delivery Semantics
//!
//! Delivery is best-effort and at-most-once per accepted alert per channel:
//!
//! - Channels run concurrently; a slow or failing channel never holds up
//!   another.
//! - Each channel gets a bounded time budget. Running out of it counts as a
//!   failure.
//! - Failures are logged and counted, never retried and never returned to
//!   the caller of the cycle. The cooldown gate has already committed.
//!
//! ## Channel Selection
//!
//! | Channel | Transport                     | Auth         | Body           |
//! |---------|-------------------------------|--------------|----------------|
//! | Email   | JSON POST to a mail API       | Bearer token | HTML + subject |
//! | SMS     | Form POST, Twilio-style API   | Basic        | Plain text     |
//!
//! Anything else (a chat webhook, a pager) only needs to implement
//! [`NotificationChannel`].
//!
//! ## Example Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use aquaguard_connectors::{
//!     email::{EmailChannel, EmailConfig},
//!     dispatcher::NotificationDispatcher,
//!     monitor::Monitor,
//! };
//! use aquaguard_core::{EngineConfig, MemorySource};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let email = EmailChannel::new(
//!     EmailConfig::new("https://mail.example.com/v1/send", "alerts@farm.example")
//!         .api_key("your-api-key")
//!         .recipient("grower@farm.example"),
//! )?;
//!
//! let dispatcher = NotificationDispatcher::new(Duration::from_secs(5)).with_channel(email);
//! let source = Arc::new(MemorySource::new());
//! let monitor = Monitor::new(EngineConfig::default(), source, dispatcher)?;
//!
//! let report = monitor.run_cycle().await;
//! println!("{}", serde_json::to_string_pretty(&report)?);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]

pub mod dispatcher;
pub mod email;
pub mod http;
pub mod monitor;
pub mod sms;

pub use dispatcher::{DeliveryOutcome, DeliveryStatus, NotificationDispatcher};
pub use monitor::{AnalysisReport, Monitor};

use std::time::Duration;

use aquaguard_core::{Alert, AlertLevel, Timestamp};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Prefix of every outbound subject line and SMS body
pub const ALERT_PREFIX: &str = "AQUAPONICS ALERT: ";

/// Common channel errors
#[derive(Debug, Error)]
pub enum ChannelError {
    /// Server answered with an error status
    #[error("Server error {status}: {message}")]
    Status { status: u16, message: String },

    /// Network, DNS or TLS failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Channel exceeded its time budget
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The blocking request task panicked or was cancelled
    #[error("Delivery task failed: {0}")]
    Task(String),
}

/// Severity of an outbound notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl Severity {
    pub const fn name(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        }
    }
}

impl From<AlertLevel> for Severity {
    fn from(level: AlertLevel) -> Self {
        match level {
            AlertLevel::Warning => Severity::Warning,
            AlertLevel::Critical => Severity::Critical,
        }
    }
}

/// What a channel is asked to deliver
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    /// One-line text, used as SMS body and email subject
    pub message: String,
    pub severity: Severity,
    pub timestamp: Timestamp,
    /// Source alert, when the notification reports one
    pub alert: Option<Alert>,
    pub recommendations: Vec<String>,
}

impl Notification {
    pub fn from_alert(alert: &Alert, recommendations: &[&str]) -> Self {
        Self {
            message: alert.message.clone(),
            severity: alert.level.into(),
            timestamp: alert.timestamp,
            alert: Some(alert.clone()),
            recommendations: recommendations.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Configuration check message, sent at `info`
    pub fn test(timestamp: Timestamp) -> Self {
        Self {
            message: "This is a test alert from your aquaponics system".to_string(),
            severity: Severity::Info,
            timestamp,
            alert: None,
            recommendations: Vec::new(),
        }
    }

    /// Subject line / SMS text with the alert prefix
    pub fn headline(&self) -> String {
        format!("{ALERT_PREFIX}{}", self.message)
    }
}

/// An outbound notification capability
#[async_trait::async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Short name used in logs and delivery outcomes
    fn name(&self) -> &str;

    /// Deliver one notification
    async fn send(&self, notification: &Notification) -> Result<(), ChannelError>;
}

/// Delivery counters for a dispatcher
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct DeliveryStats {
    /// Channel deliveries that succeeded
    pub sent: u64,
    /// Channel deliveries that returned an error
    pub failed: u64,
    /// Channel deliveries abandoned at the time budget
    pub timed_out: u64,
    /// Last error message
    pub last_error: Option<String>,
}
