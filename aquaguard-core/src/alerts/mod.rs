//! Threshold Alerts
//!
//! ## Flow
//!
//! ```text
//! reading ──► AlertEvaluator ──► Alert? ──► AlertHistory (cooldown gate) ──► accepted alerts
//!                (stateless)                  (sensor, level) → last sent
//! ```
//!
//! The evaluator is a pure function of the value and the sensor's threshold
//! set. The history is the only long-lived mutable state of the engine; it
//! drops repeats of the same sensor and level inside the cooldown window.

mod evaluator;
mod history;
mod recommendations;

pub use evaluator::{AlertEvaluator, AlertRule, Boundary, Side, ALERT_RULES};
pub use history::AlertHistory;
pub use recommendations::{recommendations_for, FALLBACK_RECOMMENDATION};

use serde::{Deserialize, Serialize};

use crate::time::Timestamp;

/// Severity of a breach of the current reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    Warning,
    Critical,
}

impl AlertLevel {
    pub const fn name(&self) -> &'static str {
        match self {
            AlertLevel::Warning => "warning",
            AlertLevel::Critical => "critical",
        }
    }

    /// Prefix used in alert messages
    pub const fn label(&self) -> &'static str {
        match self {
            AlertLevel::Warning => "WARNING",
            AlertLevel::Critical => "CRITICAL",
        }
    }
}

/// A threshold breach of one sensor's current reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub timestamp: Timestamp,
    pub sensor: String,
    pub level: AlertLevel,
    pub value: f64,
    /// The boundary the value is beyond
    pub threshold_crossed: f64,
    pub message: String,
}

impl Alert {
    pub fn is_critical(&self) -> bool {
        self.level == AlertLevel::Critical
    }
}
