//! Engine configuration
//!
//! Every field has a default, so a JSON file only needs the settings it
//! changes:
//!
//! ```rust
//! use aquaguard_core::EngineConfig;
//!
//! let config = EngineConfig::from_json_str(r#"{ "cooldown_minutes": 10 }"#).unwrap();
//! assert_eq!(config.cooldown_minutes, 10);
//! assert_eq!(config.lookback_hours, 24);
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::analysis::{MIN_TREND_SAMPLES, PREDICTION_HORIZON_HOURS};
use crate::constants::time::{DEFAULT_COOLDOWN_MINUTES, DEFAULT_LOOKBACK_HOURS, MS_PER_HOUR, MS_PER_MINUTE};
use crate::errors::{ConfigError, ConfigResult};
use crate::readings::parameters;
use crate::thresholds::ThresholdTable;
use crate::trend::TrendEstimator;

/// Settings for one analysis engine instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Minimum gap between two alerts of the same sensor and level
    pub cooldown_minutes: u64,
    /// History window fed to the trend estimator
    pub lookback_hours: u64,
    /// How far ahead trend predictions project (hours)
    pub prediction_horizon_hours: f64,
    /// Fewer samples than this yields `insufficient_data`
    pub min_trend_samples: usize,
    /// Parameters whose trends are estimated each cycle
    pub trend_parameters: Vec<String>,
    /// Bounds for current-value alerts
    pub alert_thresholds: ThresholdTable,
    /// Bounds for trend crossing predictions
    pub predictive_thresholds: ThresholdTable,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cooldown_minutes: DEFAULT_COOLDOWN_MINUTES,
            lookback_hours: DEFAULT_LOOKBACK_HOURS,
            prediction_horizon_hours: PREDICTION_HORIZON_HOURS,
            min_trend_samples: MIN_TREND_SAMPLES,
            trend_parameters: vec![
                parameters::PH.to_string(),
                parameters::TEMPERATURE.to_string(),
                parameters::DISSOLVED_OXYGEN.to_string(),
            ],
            alert_thresholds: ThresholdTable::alert_defaults(),
            predictive_thresholds: ThresholdTable::predictive_defaults(),
        }
    }
}

impl EngineConfig {
    pub fn cooldown_minutes(mut self, minutes: u64) -> Self {
        self.cooldown_minutes = minutes;
        self
    }

    pub fn lookback_hours(mut self, hours: u64) -> Self {
        self.lookback_hours = hours;
        self
    }

    pub fn prediction_horizon_hours(mut self, hours: f64) -> Self {
        self.prediction_horizon_hours = hours;
        self
    }

    pub fn min_trend_samples(mut self, samples: usize) -> Self {
        self.min_trend_samples = samples;
        self
    }

    pub fn trend_parameters<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.trend_parameters = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn alert_thresholds(mut self, table: ThresholdTable) -> Self {
        self.alert_thresholds = table;
        self
    }

    pub fn predictive_thresholds(mut self, table: ThresholdTable) -> Self {
        self.predictive_thresholds = table;
        self
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_minutes.saturating_mul(MS_PER_MINUTE))
    }

    pub fn lookback(&self) -> Duration {
        Duration::from_millis(self.lookback_hours.saturating_mul(MS_PER_HOUR))
    }

    /// Check the scalar settings
    ///
    /// Threshold tables are validated when they are built or parsed.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.lookback_hours == 0 {
            return Err(ConfigError::InvalidSetting {
                name: "lookback_hours",
                reason: "must be at least one hour",
            });
        }
        if !(self.prediction_horizon_hours.is_finite() && self.prediction_horizon_hours > 0.0) {
            return Err(ConfigError::InvalidSetting {
                name: "prediction_horizon_hours",
                reason: "must be a positive number",
            });
        }
        // A line needs two points
        if self.min_trend_samples < 2 {
            return Err(ConfigError::InvalidSetting {
                name: "min_trend_samples",
                reason: "must be at least 2",
            });
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Trend estimator honouring the sample floor and horizon
    pub fn trend_estimator(&self) -> TrendEstimator {
        TrendEstimator::with_limits(self.min_trend_samples, self.prediction_horizon_hours)
    }
}
