//! Readings and the reading-source boundary
//!
//! The engine never talks to sensors or databases itself. Everything it
//! knows about the water arrives through [`ReadingSource`]: the latest value
//! per parameter (possibly absent) and an ordered history over a lookback
//! window. Whether the values come from real probes or a simulator is
//! invisible here.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{SourceError, SourceResult};
use crate::time::Timestamp;

/// Well-known parameter names
pub mod parameters {
    /// Water pH
    pub const PH: &str = "ph";
    /// Reservoir water temperature (°C)
    pub const TEMPERATURE: &str = "temperature";
    /// Dissolved oxygen (mg/L)
    pub const DISSOLVED_OXYGEN: &str = "do";
    /// Electrical conductivity (mS/cm)
    pub const EC: &str = "ec";
    /// Fish tank temperature (°C)
    pub const FISH_TANK_TEMPERATURE: &str = "temp_fish_tank";
    /// Reservoir fill level (%)
    pub const WATER_LEVEL: &str = "water_level_percent";
}

/// Single recorded reading of one parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub parameter: String,
    pub value: f64,
    pub timestamp: Timestamp,
}

impl Reading {
    pub fn new(parameter: impl Into<String>, value: f64, timestamp: Timestamp) -> Self {
        Self {
            parameter: parameter.into(),
            value,
            timestamp,
        }
    }

    /// Strip the parameter name, keeping the time-series point
    pub fn sample(&self) -> Sample {
        Sample {
            timestamp: self.timestamp,
            value: self.value,
        }
    }
}

/// One point of a parameter's history
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: Timestamp,
    pub value: f64,
}

impl Sample {
    pub fn new(timestamp: Timestamp, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Where current values and histories come from
///
/// Implementations wrap sensor drivers and the time-series store. Errors are
/// scoped to one parameter; the monitor skips that parameter for the cycle.
pub trait ReadingSource: Send + Sync {
    /// Latest value of `parameter`, or `None` if the sensor has nothing
    fn current(&self, parameter: &str) -> SourceResult<Option<f64>>;

    /// Samples of `parameter` newer than `now - lookback`, oldest first
    fn history(&self, parameter: &str, now: Timestamp, lookback: Duration) -> SourceResult<Vec<Sample>>;
}

/// In-memory reading source for testing and replay
///
/// ## Use Cases
///
/// 1. **Unit Testing**: Feed known series into the monitor
/// 2. **Replay**: Re-analyse recorded data
/// 3. **Simulation**: Drive the engine from synthetic values
///
/// ```rust
/// use aquaguard_core::readings::{MemorySource, ReadingSource};
/// use std::time::Duration;
///
/// let source = MemorySource::new();
/// source.record("ph", 1_000, 7.1);
/// source.record("ph", 2_000, 7.0);
///
/// assert_eq!(source.current("ph").unwrap(), Some(7.0));
/// let history = source.history("ph", 2_000, Duration::from_secs(3600)).unwrap();
/// assert_eq!(history.len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct MemorySource {
    series: RwLock<HashMap<String, Vec<Sample>>>,
    current: RwLock<HashMap<String, f64>>,
    offline: RwLock<Vec<String>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sample and make it the current value
    pub fn record(&self, parameter: &str, timestamp: Timestamp, value: f64) {
        if let Ok(mut series) = self.series.write() {
            let samples = series.entry(parameter.to_string()).or_default();
            let index = samples.partition_point(|s| s.timestamp <= timestamp);
            samples.insert(index, Sample::new(timestamp, value));
        }
        if let Ok(mut current) = self.current.write() {
            current.insert(parameter.to_string(), value);
        }
    }

    /// Append an evenly spaced series starting at `start`
    pub fn record_series(&self, parameter: &str, start: Timestamp, interval_ms: u64, values: &[f64]) {
        for (i, value) in values.iter().enumerate() {
            self.record(parameter, start + i as u64 * interval_ms, *value);
        }
    }

    /// Override the current value without touching history
    pub fn set_current(&self, parameter: &str, value: f64) {
        if let Ok(mut current) = self.current.write() {
            current.insert(parameter.to_string(), value);
        }
    }

    /// Clear the current value, as if the sensor returned nothing
    pub fn clear_current(&self, parameter: &str) {
        if let Ok(mut current) = self.current.write() {
            current.remove(parameter);
        }
    }

    /// Make every query for `parameter` fail
    pub fn set_offline(&self, parameter: &str) {
        if let Ok(mut offline) = self.offline.write() {
            offline.push(parameter.to_string());
        }
    }

    fn check_online(&self, parameter: &str) -> SourceResult<()> {
        let offline = self
            .offline
            .read()
            .map_err(|_| SourceError::Unavailable(parameter.to_string()))?;
        if offline.iter().any(|p| p == parameter) {
            return Err(SourceError::Unavailable(parameter.to_string()));
        }
        Ok(())
    }
}

impl ReadingSource for MemorySource {
    fn current(&self, parameter: &str) -> SourceResult<Option<f64>> {
        self.check_online(parameter)?;
        let current = self
            .current
            .read()
            .map_err(|_| SourceError::Unavailable(parameter.to_string()))?;
        Ok(current.get(parameter).copied())
    }

    fn history(&self, parameter: &str, now: Timestamp, lookback: Duration) -> SourceResult<Vec<Sample>> {
        self.check_online(parameter)?;
        let since = now.saturating_sub(u64::try_from(lookback.as_millis()).unwrap_or(u64::MAX));
        let series = self.series.read().map_err(|_| SourceError::Query {
            parameter: parameter.to_string(),
            reason: "series lock poisoned".to_string(),
        })?;
        Ok(series
            .get(parameter)
            .map(|samples| {
                samples
                    .iter()
                    .filter(|s| s.timestamp >= since && s.timestamp <= now)
                    .copied()
                    .collect()
            })
            .unwrap_or_default())
    }
}
