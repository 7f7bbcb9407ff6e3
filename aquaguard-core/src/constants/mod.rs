//! Constants for AquaGuard Core
//!
//! This module provides centralized, documented constants used throughout
//! the analysis engine. Numeric values that decide an alert, a trend
//! direction or a diagnosis live here instead of as magic numbers.
//!
//! ## Organization
//!
//! Constants are grouped by domain:
//! - **Time**: Unit conversions and default windows
//! - **Analysis**: Regression, volatility and concern cutoffs
//! - **Water**: Water-quality bands used by the diagnosis patterns

/// Time-related constants for windows, cooldowns and unit conversion.
pub mod time;

/// Trend and concern-level cutoffs.
pub mod analysis;

/// Water-quality bands for pH, temperature and dissolved oxygen.
pub mod water;

// Re-export commonly used constants for convenience
pub use time::{MS_PER_HOUR, MS_PER_MINUTE, DEFAULT_COOLDOWN_MINUTES, DEFAULT_LOOKBACK_HOURS};

pub use analysis::{
    MIN_TREND_SAMPLES, STABLE_SLOPE_LIMIT, DIRECTION_SLOPE_LIMIT,
    CRITICAL_HORIZON_HOURS, WARNING_HORIZON_HOURS, PREDICTION_HORIZON_HOURS,
};
