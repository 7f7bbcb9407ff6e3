//! Shared fixtures for the analysis integration tests
//!
//! Series generators produce evenly spaced samples so regression results
//! are easy to reason about by hand.

#![allow(dead_code)]

use std::collections::BTreeMap;

use aquaguard_core::{
    constants::MS_PER_HOUR, Sample, ThresholdTable, Timestamp, TrendEstimator, TrendResult,
};

/// Start of every generated series
pub const T0: Timestamp = 1_700_000_000_000;

/// One sample per hour starting at [`T0`]
pub fn hourly(values: &[f64]) -> Vec<Sample> {
    spaced(values, MS_PER_HOUR)
}

pub fn spaced(values: &[f64], interval_ms: u64) -> Vec<Sample> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| Sample::new(T0 + i as u64 * interval_ms, *v))
        .collect()
}

/// `count` hourly samples on the line `start + slope * hour`
pub fn linear(start: f64, slope_per_hour: f64, count: usize) -> Vec<f64> {
    (0..count).map(|i| start + slope_per_hour * i as f64).collect()
}

/// Deterministic +/- jitter around a flat level
pub fn jittered(level: f64, amplitude: f64, count: usize) -> Vec<f64> {
    (0..count)
        .map(|i| if i % 2 == 0 { level + amplitude } else { level - amplitude })
        .collect()
}

/// One cycle's worth of readings and trends
pub struct Cycle {
    pub readings: BTreeMap<String, f64>,
    pub trends: BTreeMap<String, TrendResult>,
}

impl Cycle {
    /// Estimate a trend for each `(parameter, hourly values)` pair against
    /// the predictive defaults; the last value is the current reading
    pub fn from_series(series: &[(&str, Vec<f64>)]) -> Self {
        let estimator = TrendEstimator::new();
        let table = ThresholdTable::predictive_defaults();
        let mut readings = BTreeMap::new();
        let mut trends = BTreeMap::new();

        for (parameter, values) in series {
            if let Some(last) = values.last() {
                readings.insert(parameter.to_string(), *last);
            }
            let trend = estimator.analyze(parameter, &hourly(values), table.get(parameter));
            trends.insert(parameter.to_string(), trend);
        }

        Self { readings, trends }
    }
}
