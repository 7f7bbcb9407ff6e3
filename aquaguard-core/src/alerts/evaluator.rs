//! Alert evaluation as an ordered rule list
//!
//! Rules are checked top-down and the first breach wins:
//!
//! | # | Level    | Test                  | Message          |
//! |---|----------|-----------------------|------------------|
//! | 1 | critical | value < critical_low  | dangerously low  |
//! | 2 | critical | value > critical_high | dangerously high |
//! | 3 | warning  | value < warning_low   | low              |
//! | 4 | warning  | value > warning_high  | high             |
//!
//! Critical beats warning; at each severity the low side is checked first.
//! Comparisons are strict, so a value sitting exactly on a boundary does not
//! alert. Rules whose boundary is absent from the set are skipped.

use crate::thresholds::ThresholdSet;
use crate::time::Timestamp;

use super::{Alert, AlertLevel};

/// Which boundary of a threshold set a rule reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    CriticalLow,
    WarningLow,
    WarningHigh,
    CriticalHigh,
}

impl Boundary {
    pub fn of(&self, set: &ThresholdSet) -> Option<f64> {
        match self {
            Boundary::CriticalLow => set.critical_low,
            Boundary::WarningLow => set.warning_low,
            Boundary::WarningHigh => set.warning_high,
            Boundary::CriticalHigh => set.critical_high,
        }
    }
}

/// Which side of the boundary is a breach
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Below,
    Above,
}

impl Side {
    pub fn breached(&self, value: f64, bound: f64) -> bool {
        match self {
            Side::Below => value < bound,
            Side::Above => value > bound,
        }
    }
}

/// One row of the alert rule list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertRule {
    pub level: AlertLevel,
    pub boundary: Boundary,
    pub side: Side,
    pub description: &'static str,
}

/// Evaluation order; the first matching rule produces the alert
pub static ALERT_RULES: [AlertRule; 4] = [
    AlertRule {
        level: AlertLevel::Critical,
        boundary: Boundary::CriticalLow,
        side: Side::Below,
        description: "dangerously low",
    },
    AlertRule {
        level: AlertLevel::Critical,
        boundary: Boundary::CriticalHigh,
        side: Side::Above,
        description: "dangerously high",
    },
    AlertRule {
        level: AlertLevel::Warning,
        boundary: Boundary::WarningLow,
        side: Side::Below,
        description: "low",
    },
    AlertRule {
        level: AlertLevel::Warning,
        boundary: Boundary::WarningHigh,
        side: Side::Above,
        description: "high",
    },
];

/// Maps a sensor value to at most one alert
#[derive(Debug, Clone, Copy, Default)]
pub struct AlertEvaluator;

impl AlertEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// First rule breached by `value`, if any
    pub fn matching_rule(&self, value: f64, thresholds: &ThresholdSet) -> Option<(&'static AlertRule, f64)> {
        ALERT_RULES.iter().find_map(|rule| {
            rule.boundary
                .of(thresholds)
                .filter(|bound| rule.side.breached(value, *bound))
                .map(|bound| (rule, bound))
        })
    }

    /// Evaluate one reading; no side effects
    pub fn evaluate(&self, sensor: &str, value: f64, thresholds: &ThresholdSet, timestamp: Timestamp) -> Option<Alert> {
        let (rule, bound) = self.matching_rule(value, thresholds)?;
        Some(Alert {
            timestamp,
            sensor: sensor.to_string(),
            level: rule.level,
            value,
            threshold_crossed: bound,
            message: format!("{}: {} is {} ({:.2})", rule.level.label(), sensor, rule.description, value),
        })
    }
}
