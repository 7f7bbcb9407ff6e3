//! Threshold Sets and Tables
//!
//! ## Overview
//!
//! Every monitored parameter has up to six boundaries:
//!
//! ```text
//!  critical_low < warning_low < optimal_low ≤ optimal_high < warning_high < critical_high
//!  ─────┬─────────────┬─────────────┬──────────────┬──────────────┬──────────────┬─────
//!   critical      warning        watch          optimal         watch       warning   critical
//! ```
//!
//! Any boundary may be absent. Water level, for example, has no high-side
//! warning or critical bound: an overfull reservoir just overflows.
//!
//! ## Two Tables
//!
//! The engine uses two tables with the same shape:
//! - **Alert table**: boundaries for the *current* reading. Crossing one is
//!   an alert right now.
//! - **Predictive table**: boundaries the trend predictor projects towards.
//!   These sit closer to the biofilter's comfort zone so that concern rises
//!   before the alert table would fire.
//!
//! ## Validation
//!
//! Ordering is checked once, when a set enters a table. A table that loaded
//! is well formed for the life of the process.
//!
//! ```rust
//! use aquaguard_core::thresholds::{ThresholdSet, ThresholdTable};
//!
//! let mut table = ThresholdTable::new();
//! table.insert("ph", ThresholdSet::new(6.0, 6.5, 6.8, 7.5, 8.0, 8.5))?;
//!
//! // Warning above critical: rejected
//! let broken = ThresholdSet::new(6.6, 6.5, 6.8, 7.5, 8.0, 8.5);
//! assert!(table.insert("ph", broken).is_err());
//! # Ok::<(), aquaguard_core::ConfigError>(())
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{ConfigError, ConfigResult};
use crate::readings::parameters;

/// Boundaries for one parameter
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThresholdSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub critical_low: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning_low: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimal_low: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimal_high: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning_high: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub critical_high: Option<f64>,
}

impl ThresholdSet {
    /// Fully bounded set
    pub fn new(
        critical_low: f64,
        warning_low: f64,
        optimal_low: f64,
        optimal_high: f64,
        warning_high: f64,
        critical_high: f64,
    ) -> Self {
        Self {
            critical_low: Some(critical_low),
            warning_low: Some(warning_low),
            optimal_low: Some(optimal_low),
            optimal_high: Some(optimal_high),
            warning_high: Some(warning_high),
            critical_high: Some(critical_high),
        }
    }

    /// Set with only low-side and optimal boundaries
    pub fn low_side(critical_low: f64, warning_low: f64, optimal_low: f64, optimal_high: f64) -> Self {
        Self {
            critical_low: Some(critical_low),
            warning_low: Some(warning_low),
            optimal_low: Some(optimal_low),
            optimal_high: Some(optimal_high),
            ..Self::default()
        }
    }

    /// Boundaries in ascending order with their names
    pub fn boundaries(&self) -> [(&'static str, Option<f64>); 6] {
        [
            ("critical_low", self.critical_low),
            ("warning_low", self.warning_low),
            ("optimal_low", self.optimal_low),
            ("optimal_high", self.optimal_high),
            ("warning_high", self.warning_high),
            ("critical_high", self.critical_high),
        ]
    }

    /// Check that present boundaries are finite and ascending
    ///
    /// Every pair is strict except `optimal_low ≤ optimal_high`, which may
    /// collapse to a single set point.
    pub fn validate(&self, parameter: &str) -> ConfigResult<()> {
        let mut previous: Option<(&'static str, f64)> = None;

        for (name, bound) in self.boundaries() {
            let Some(value) = bound else { continue };
            if !value.is_finite() {
                return Err(ConfigError::NonFinite {
                    parameter: parameter.to_string(),
                    boundary: name,
                });
            }
            if let Some((lower, lower_value)) = previous {
                let equal_allowed = lower == "optimal_low" && name == "optimal_high";
                let ordered = if equal_allowed { lower_value <= value } else { lower_value < value };
                if !ordered {
                    return Err(ConfigError::Ordering {
                        parameter: parameter.to_string(),
                        lower,
                        lower_value,
                        upper: name,
                        upper_value: value,
                    });
                }
            }
            previous = Some((name, value));
        }

        Ok(())
    }

    /// Whether `value` lies in the optimal band; a missing side is unbounded
    pub fn in_optimal_band(&self, value: f64) -> bool {
        self.optimal_low.map_or(true, |low| value >= low)
            && self.optimal_high.map_or(true, |high| value <= high)
    }
}

/// Validated mapping from parameter name to its threshold set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, ThresholdSet>", into = "BTreeMap<String, ThresholdSet>")]
pub struct ThresholdTable {
    sets: BTreeMap<String, ThresholdSet>,
}

impl TryFrom<BTreeMap<String, ThresholdSet>> for ThresholdTable {
    type Error = ConfigError;

    fn try_from(sets: BTreeMap<String, ThresholdSet>) -> ConfigResult<Self> {
        for (parameter, set) in &sets {
            set.validate(parameter)?;
        }
        Ok(Self { sets })
    }
}

impl From<ThresholdTable> for BTreeMap<String, ThresholdSet> {
    fn from(table: ThresholdTable) -> Self {
        table.sets
    }
}

impl ThresholdTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and insert (or replace) the set for `parameter`
    pub fn insert(&mut self, parameter: impl Into<String>, set: ThresholdSet) -> ConfigResult<()> {
        let parameter = parameter.into();
        set.validate(&parameter)?;
        self.sets.insert(parameter, set);
        Ok(())
    }

    pub fn get(&self, parameter: &str) -> Option<&ThresholdSet> {
        self.sets.get(parameter)
    }

    pub fn contains(&self, parameter: &str) -> bool {
        self.sets.contains_key(parameter)
    }

    /// Parameter names in sorted order
    pub fn parameters(&self) -> impl Iterator<Item = &str> {
        self.sets.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ThresholdSet)> {
        self.sets.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Parse and validate a JSON object of `{ parameter: ThresholdSet }`
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let sets: BTreeMap<String, ThresholdSet> = serde_json::from_str(json)?;
        Self::try_from(sets)
    }

    /// Read, parse and validate a JSON threshold file
    pub fn from_path(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Boundaries the trend predictor projects towards
    pub fn predictive_defaults() -> Self {
        Self::from_entries([
            (parameters::PH, ThresholdSet::new(6.0, 6.5, 6.8, 7.5, 8.0, 8.5)),
            (parameters::TEMPERATURE, ThresholdSet::new(15.0, 18.0, 20.0, 24.0, 26.0, 28.0)),
            (parameters::DISSOLVED_OXYGEN, ThresholdSet::new(4.0, 6.0, 7.0, 10.0, 12.0, 15.0)),
        ])
    }

    /// Boundaries the current reading is alerted against
    pub fn alert_defaults() -> Self {
        Self::from_entries([
            (parameters::PH, ThresholdSet::new(5.0, 5.5, 6.0, 7.0, 7.5, 8.0)),
            (parameters::EC, ThresholdSet::new(0.5, 0.8, 1.0, 1.8, 2.5, 3.0)),
            (parameters::DISSOLVED_OXYGEN, ThresholdSet::new(4.0, 5.0, 6.0, 9.0, 12.0, 15.0)),
            (parameters::TEMPERATURE, ThresholdSet::new(10.0, 16.0, 18.0, 22.0, 24.0, 28.0)),
            (parameters::FISH_TANK_TEMPERATURE, ThresholdSet::new(8.0, 10.0, 12.0, 15.0, 18.0, 20.0)),
            (parameters::WATER_LEVEL, ThresholdSet::low_side(20.0, 30.0, 50.0, 90.0)),
        ])
    }

    // Built-in sets are ordered by construction
    fn from_entries<const N: usize>(entries: [(&str, ThresholdSet); N]) -> Self {
        let sets = entries
            .into_iter()
            .map(|(name, set)| {
                debug_assert!(set.validate(name).is_ok(), "built-in thresholds for {name} out of order");
                (name.to_string(), set)
            })
            .collect();
        Self { sets }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_ordered() {
        for table in [ThresholdTable::predictive_defaults(), ThresholdTable::alert_defaults()] {
            for (parameter, set) in table.iter() {
                assert!(set.validate(parameter).is_ok(), "{parameter}");
            }
        }
    }

    #[test]
    fn optimal_band_may_collapse() {
        let set = ThresholdSet::new(1.0, 2.0, 3.0, 3.0, 4.0, 5.0);
        assert!(set.validate("x").is_ok());
    }

    #[test]
    fn equal_warning_and_critical_rejected() {
        let set = ThresholdSet::new(2.0, 2.0, 3.0, 4.0, 5.0, 6.0);
        let err = set.validate("x").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Ordering { lower: "critical_low", upper: "warning_low", .. }
        ));
    }

    #[test]
    fn gaps_are_checked_across_missing_bounds() {
        // critical_low above optimal_low with warning_low absent
        let set = ThresholdSet {
            critical_low: Some(7.0),
            optimal_low: Some(6.0),
            ..ThresholdSet::default()
        };
        assert!(set.validate("ph").is_err());
    }

    #[test]
    fn non_finite_rejected() {
        let set = ThresholdSet {
            warning_high: Some(f64::NAN),
            ..ThresholdSet::default()
        };
        assert!(matches!(set.validate("ph"), Err(ConfigError::NonFinite { boundary: "warning_high", .. })));
    }

    #[test]
    fn json_round_trip_through_validation() {
        let json = r#"{
            "water_level_percent": { "critical_low": 20, "warning_low": 30, "optimal_low": 50, "optimal_high": 90 },
            "ec": { "warning_low": 0.8, "warning_high": 2.5 }
        }"#;
        let table = ThresholdTable::from_json_str(json).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("ec").unwrap().critical_low, None);
        assert_eq!(table.get("water_level_percent").unwrap().warning_high, None);
    }

    #[test]
    fn malformed_json_ordering_is_fatal() {
        let json = r#"{ "do": { "warning_low": 6.0, "critical_low": 7.0 } }"#;
        assert!(matches!(ThresholdTable::from_json_str(json), Err(ConfigError::Ordering { .. })));
    }

    #[test]
    fn unknown_fields_rejected() {
        let json = r#"{ "do": { "warn_low": 6.0 } }"#;
        assert!(matches!(ThresholdTable::from_json_str(json), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "ph": {{ "critical_low": 5.0, "critical_high": 8.0 }} }}"#).unwrap();

        let table = ThresholdTable::from_path(file.path()).unwrap();
        assert_eq!(table.get("ph").unwrap().critical_high, Some(8.0));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = ThresholdTable::from_path("/nonexistent/thresholds.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn optimal_band_membership() {
        let set = ThresholdTable::predictive_defaults().get("ph").copied().unwrap();
        assert!(set.in_optimal_band(6.8));
        assert!(set.in_optimal_band(7.5));
        assert!(!set.in_optimal_band(6.79));

        let open = ThresholdSet { optimal_low: Some(50.0), ..ThresholdSet::default() };
        assert!(open.in_optimal_band(1e6));
    }
}
