//! Threshold-crossing prediction
//!
//! Given where a parameter is now and how fast it is moving, estimate how
//! many hours remain before it reaches the next boundary of its predictive
//! threshold set, and turn that into a concern level.
//!
//! ## Escalation
//!
//! For a falling trend (the rising case mirrors it against the high side):
//!
//! ```text
//! hours_to_critical = (current - critical_low) / |rate|
//! hours_to_warning  = (current - warning_low)  / |rate|
//!
//! hours_to_critical < 12        → critical
//! else hours_to_warning < 24    → warning
//! else current > optimal_low    → watch
//! else                          → none
//! ```
//!
//! A value already past a boundary has no time-to-threshold for it; the
//! alert evaluator deals with breaches of the current reading. This module
//! only forecasts.

use serde::{Deserialize, Serialize};

use crate::constants::analysis::{CRITICAL_HORIZON_HOURS, WARNING_HORIZON_HOURS};
use crate::thresholds::ThresholdSet;
use crate::trend::TrendDirection;

/// How worried to be about a parameter's trajectory
///
/// Ordered from least to most severe so levels can be compared and maxed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConcernLevel {
    #[default]
    None,
    Watch,
    Warning,
    Critical,
}

impl ConcernLevel {
    pub const fn name(&self) -> &'static str {
        match self {
            ConcernLevel::None => "none",
            ConcernLevel::Watch => "watch",
            ConcernLevel::Warning => "warning",
            ConcernLevel::Critical => "critical",
        }
    }

    /// Warning or critical
    pub const fn is_urgent(&self) -> bool {
        matches!(self, ConcernLevel::Warning | ConcernLevel::Critical)
    }
}

/// Outcome of a crossing prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConcernAssessment {
    pub level: ConcernLevel,
    /// Projected hours to the boundary that set `level`, one decimal place
    pub time_to_threshold: Option<f64>,
    pub recommendation: String,
}

impl ConcernAssessment {
    fn new(level: ConcernLevel, time_to_threshold: Option<f64>, recommendation: String) -> Self {
        Self {
            level,
            time_to_threshold,
            recommendation,
        }
    }
}

/// Predicts when a trending parameter will cross its thresholds
#[derive(Debug, Clone)]
pub struct ThresholdCrossingPredictor {
    /// Time-to-critical below which concern is critical (hours)
    critical_horizon_hours: f64,
    /// Time-to-warning below which concern is warning (hours)
    warning_horizon_hours: f64,
}

impl Default for ThresholdCrossingPredictor {
    fn default() -> Self {
        Self {
            critical_horizon_hours: CRITICAL_HORIZON_HOURS,
            warning_horizon_hours: WARNING_HORIZON_HOURS,
        }
    }
}

impl ThresholdCrossingPredictor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assess concern for one parameter
    ///
    /// `thresholds` is the parameter's predictive set; without one the level
    /// is always `none`.
    pub fn assess(
        &self,
        parameter: &str,
        current: f64,
        direction: TrendDirection,
        rate: f64,
        thresholds: Option<&ThresholdSet>,
    ) -> ConcernAssessment {
        let Some(thresh) = thresholds else {
            return ConcernAssessment::new(ConcernLevel::None, None, "No thresholds defined".to_string());
        };
        let name = parameter.to_uppercase();

        match direction {
            TrendDirection::Falling if rate < 0.0 => self.assess_falling(&name, current, rate, thresh),
            TrendDirection::Rising if rate > 0.0 => self.assess_rising(&name, current, rate, thresh),
            TrendDirection::InsufficientData => ConcernAssessment::new(
                ConcernLevel::None,
                None,
                "Need more data points (collecting...)".to_string(),
            ),
            _ => {
                if thresh.in_optimal_band(current) {
                    ConcernAssessment::new(
                        ConcernLevel::None,
                        None,
                        format!("{name} stable in optimal range. Continue current management."),
                    )
                } else {
                    ConcernAssessment::new(
                        ConcernLevel::Watch,
                        None,
                        format!("{name} outside optimal but stable. Watch for changes."),
                    )
                }
            }
        }
    }

    fn assess_falling(&self, name: &str, current: f64, rate: f64, thresh: &ThresholdSet) -> ConcernAssessment {
        let speed = rate.abs();
        let hours_to = |bound: Option<f64>| bound.filter(|b| current > *b).map(|b| (current - b) / speed);
        let hours_to_warning = hours_to(thresh.warning_low);
        let hours_to_critical = hours_to(thresh.critical_low);

        if let (Some(hours), Some(bound)) = (hours_to_critical, thresh.critical_low) {
            if hours < self.critical_horizon_hours {
                return ConcernAssessment::new(
                    ConcernLevel::Critical,
                    Some(round_to(hours, 1)),
                    format!(
                        "URGENT: {name} dropping fast! Will reach critical threshold ({bound}) in {hours:.1} hours. Take action NOW to reverse trend."
                    ),
                );
            }
        }
        if let (Some(hours), Some(bound)) = (hours_to_warning, thresh.warning_low) {
            if hours < self.warning_horizon_hours {
                return ConcernAssessment::new(
                    ConcernLevel::Warning,
                    Some(round_to(hours, 1)),
                    format!(
                        "{name} declining. Will reach warning threshold ({bound}) in {hours:.1} hours. Prepare to intervene."
                    ),
                );
            }
        }
        if thresh.optimal_low.map_or(true, |low| current > low) {
            return ConcernAssessment::new(
                ConcernLevel::Watch,
                None,
                format!("{name} trending down at {speed:.3}/hour. Monitor closely."),
            );
        }
        ConcernAssessment::new(ConcernLevel::None, None, "Continue monitoring".to_string())
    }

    fn assess_rising(&self, name: &str, current: f64, rate: f64, thresh: &ThresholdSet) -> ConcernAssessment {
        let hours_to = |bound: Option<f64>| bound.filter(|b| current < *b).map(|b| (b - current) / rate);
        let hours_to_warning = hours_to(thresh.warning_high);
        let hours_to_critical = hours_to(thresh.critical_high);

        if let (Some(hours), Some(bound)) = (hours_to_critical, thresh.critical_high) {
            if hours < self.critical_horizon_hours {
                return ConcernAssessment::new(
                    ConcernLevel::Critical,
                    Some(round_to(hours, 1)),
                    format!(
                        "URGENT: {name} rising fast! Will reach critical threshold ({bound}) in {hours:.1} hours. Take action NOW."
                    ),
                );
            }
        }
        if let (Some(hours), Some(bound)) = (hours_to_warning, thresh.warning_high) {
            if hours < self.warning_horizon_hours {
                return ConcernAssessment::new(
                    ConcernLevel::Warning,
                    Some(round_to(hours, 1)),
                    format!("{name} increasing. Will reach warning threshold ({bound}) in {hours:.1} hours."),
                );
            }
        }
        if thresh.optimal_high.map_or(true, |high| current < high) {
            return ConcernAssessment::new(
                ConcernLevel::Watch,
                None,
                format!("{name} trending up at {rate:.3}/hour. Monitor closely."),
            );
        }
        ConcernAssessment::new(ConcernLevel::None, None, "Continue monitoring".to_string())
    }
}

/// Round half away from zero to `decimals` places
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
