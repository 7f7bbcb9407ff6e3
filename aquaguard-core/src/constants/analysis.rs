//! Trend and Concern Cutoffs
//!
//! Slopes are expressed in parameter units per hour.

// ===== TREND ESTIMATION =====

/// Fewer samples than this and a trend is reported as insufficient data.
pub const MIN_TREND_SAMPLES: usize = 5;

/// Slopes with magnitude below this are flat.
pub const STABLE_SLOPE_LIMIT: f64 = 0.01;

/// Slopes must exceed this magnitude to count as rising or falling.
///
/// Magnitudes between `STABLE_SLOPE_LIMIT` and this value are also reported
/// as stable, which keeps noisy-but-flat signals from flapping.
pub const DIRECTION_SLOPE_LIMIT: f64 = 0.05;

/// Prediction confidence is high above this slope magnitude.
pub const CONFIDENT_SLOPE_LIMIT: f64 = 0.01;

/// Minimum samples for a volatility estimate.
pub const MIN_VOLATILITY_SAMPLES: usize = 3;

/// Coefficient of variation (%) below which a series is stable.
pub const CV_STABLE_PCT: f64 = 2.0;

/// Coefficient of variation (%) below which a series is moderately volatile.
pub const CV_MODERATE_PCT: f64 = 5.0;

/// How far ahead the linear prediction projects (hours).
pub const PREDICTION_HORIZON_HOURS: f64 = 24.0;

/// Number of trailing samples kept on a trend result for charts.
pub const RECENT_SAMPLES_KEPT: usize = 10;

// ===== CONCERN ESCALATION =====

/// Projected hours to the critical boundary below which concern is critical.
pub const CRITICAL_HORIZON_HOURS: f64 = 12.0;

/// Projected hours to the warning boundary below which concern is warning.
pub const WARNING_HORIZON_HOURS: f64 = 24.0;

/// Sort key for urgent actions with no time-to-threshold (hours).
pub const UNKNOWN_DEADLINE_HOURS: f64 = 999.0;
