//! Trend Estimation
//!
//! ## Overview
//!
//! Turns a parameter's recent history into a direction, a rate of change per
//! hour, a volatility class and a 24-hour projection, then hands the result
//! to the [`ThresholdCrossingPredictor`] for a concern level.
//!
//! ## Regression
//!
//! Timestamps are converted to hours since the first sample and an ordinary
//! least-squares line is fitted:
//!
//! ```text
//! slope = (n·Σxy − Σx·Σy) / (n·Σx² − (Σx)²)
//! ```
//!
//! A zero denominator (every sample at the same instant) gives a zero slope.
//!
//! ## Direction
//!
//! ```text
//!        falling          stable (dead zone)          rising
//!  ◄───────────────┼──────────────────────────────┼───────────────►
//!               -0.05      -0.01   0   0.01      0.05        slope/h
//! ```
//!
//! Slopes between 0.01 and 0.05 in magnitude are reported as stable too.
//! Noisy but flat signals stay quiet instead of flapping between rising and
//! falling every cycle.
//!
//! ## Volatility
//!
//! Coefficient of variation `stdev / mean × 100` (sample stdev):
//! `< 2` stable, `< 5` moderate, otherwise volatile. Fewer than three points
//! or a zero mean is `unknown`.

use serde::{Deserialize, Serialize};

use crate::constants::analysis::{
    CONFIDENT_SLOPE_LIMIT, CV_MODERATE_PCT, CV_STABLE_PCT, DIRECTION_SLOPE_LIMIT, MIN_TREND_SAMPLES,
    MIN_VOLATILITY_SAMPLES, PREDICTION_HORIZON_HOURS, RECENT_SAMPLES_KEPT, STABLE_SLOPE_LIMIT,
};
use crate::prediction::{round_to, ConcernLevel, ThresholdCrossingPredictor};
use crate::readings::Sample;
use crate::thresholds::ThresholdSet;
use crate::time::hours_between;

/// Direction of a parameter's trend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Rising,
    Falling,
    Stable,
    InsufficientData,
}

impl TrendDirection {
    /// Classify a slope (units/hour)
    pub fn from_slope(slope: f64) -> Self {
        if slope.abs() < STABLE_SLOPE_LIMIT {
            TrendDirection::Stable
        } else if slope > DIRECTION_SLOPE_LIMIT {
            TrendDirection::Rising
        } else if slope < -DIRECTION_SLOPE_LIMIT {
            TrendDirection::Falling
        } else {
            TrendDirection::Stable
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            TrendDirection::Rising => "rising",
            TrendDirection::Falling => "falling",
            TrendDirection::Stable => "stable",
            TrendDirection::InsufficientData => "insufficient_data",
        }
    }
}

/// How much a series scatters around its mean
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Volatility {
    Stable,
    Moderate,
    Volatile,
    Unknown,
}

/// Confidence in a linear projection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Low,
}

/// Linear projection of a parameter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub hours_ahead: f64,
    /// Projected value, two decimal places
    pub predicted_value: f64,
    pub confidence: Confidence,
}

/// Trend of one parameter for one analysis cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendResult {
    pub parameter: String,
    /// Latest value in the history, if any
    pub current_value: Option<f64>,
    pub direction: TrendDirection,
    /// Units per hour
    pub rate_of_change: f64,
    pub volatility: Volatility,
    pub prediction: Option<Prediction>,
    pub concern_level: ConcernLevel,
    /// Hours until the boundary behind `concern_level`
    pub time_to_threshold: Option<f64>,
    pub recommendation: String,
    /// Trailing samples for charting
    pub recent: Vec<Sample>,
}

impl TrendResult {
    /// Result for a history too short to fit
    pub fn insufficient(parameter: &str, samples: &[Sample]) -> Self {
        Self {
            parameter: parameter.to_string(),
            current_value: samples.last().map(|s| s.value),
            direction: TrendDirection::InsufficientData,
            rate_of_change: 0.0,
            volatility: Volatility::Unknown,
            prediction: None,
            concern_level: ConcernLevel::None,
            time_to_threshold: None,
            recommendation: "Need more data points (collecting...)".to_string(),
            recent: tail(samples),
        }
    }

    pub fn is_falling(&self) -> bool {
        self.direction == TrendDirection::Falling
    }

    pub fn is_rising(&self) -> bool {
        self.direction == TrendDirection::Rising
    }

    pub fn is_stable(&self) -> bool {
        self.direction == TrendDirection::Stable
    }
}

/// Estimates trends from parameter histories
#[derive(Debug, Clone)]
pub struct TrendEstimator {
    min_samples: usize,
    horizon_hours: f64,
    predictor: ThresholdCrossingPredictor,
}

impl Default for TrendEstimator {
    fn default() -> Self {
        Self {
            min_samples: MIN_TREND_SAMPLES,
            horizon_hours: PREDICTION_HORIZON_HOURS,
            predictor: ThresholdCrossingPredictor::default(),
        }
    }
}

impl TrendEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the sample floor and projection horizon
    pub fn with_limits(min_samples: usize, horizon_hours: f64) -> Self {
        Self {
            min_samples,
            horizon_hours,
            ..Self::default()
        }
    }

    /// Analyse `samples` (oldest first) against the parameter's predictive set
    pub fn analyze(&self, parameter: &str, samples: &[Sample], thresholds: Option<&ThresholdSet>) -> TrendResult {
        let Some(last) = samples.last().filter(|_| samples.len() >= self.min_samples) else {
            return TrendResult::insufficient(parameter, samples);
        };

        let current = last.value;
        let rate = slope(samples);
        let direction = TrendDirection::from_slope(rate);
        let values: Vec<f64> = samples.iter().map(|s| s.value).collect();
        let prediction = self.predict(current, rate);
        let concern = self.predictor.assess(parameter, current, direction, rate, thresholds);

        TrendResult {
            parameter: parameter.to_string(),
            current_value: Some(current),
            direction,
            rate_of_change: rate,
            volatility: volatility(&values),
            prediction: Some(prediction),
            concern_level: concern.level,
            time_to_threshold: concern.time_to_threshold,
            recommendation: concern.recommendation,
            recent: tail(samples),
        }
    }

    /// Project `current` forward along `rate` for the configured horizon
    pub fn predict(&self, current: f64, rate: f64) -> Prediction {
        Prediction {
            hours_ahead: self.horizon_hours,
            predicted_value: round_to(current + rate * self.horizon_hours, 2),
            confidence: if rate.abs() > CONFIDENT_SLOPE_LIMIT {
                Confidence::High
            } else {
                Confidence::Low
            },
        }
    }
}

/// Least-squares slope in units per hour, time measured from the first sample
pub fn slope(samples: &[Sample]) -> f64 {
    let Some(first) = samples.first() else {
        return 0.0;
    };
    let n = samples.len() as f64;
    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_x2) = (0.0, 0.0, 0.0, 0.0);

    for sample in samples {
        let x = hours_between(first.timestamp, sample.timestamp);
        let y = sample.value;
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_x2 += x * x;
    }

    let denominator = n * sum_x2 - sum_x * sum_x;
    if denominator == 0.0 {
        return 0.0;
    }
    (n * sum_xy - sum_x * sum_y) / denominator
}

/// Volatility class from the coefficient of variation
pub fn volatility(values: &[f64]) -> Volatility {
    if values.len() < MIN_VOLATILITY_SAMPLES {
        return Volatility::Unknown;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if mean == 0.0 {
        return Volatility::Unknown;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let cv = variance.sqrt() / mean * 100.0;

    if cv < CV_STABLE_PCT {
        Volatility::Stable
    } else if cv < CV_MODERATE_PCT {
        Volatility::Moderate
    } else {
        Volatility::Volatile
    }
}

fn tail(samples: &[Sample]) -> Vec<Sample> {
    samples[samples.len().saturating_sub(RECENT_SAMPLES_KEPT)..].to_vec()
}
