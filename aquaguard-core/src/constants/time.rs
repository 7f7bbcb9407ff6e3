//! Time-Related Constants
//!
//! Time intervals and conversion factors used for cooldowns, lookback
//! windows and hour-based regression.

// ===== TIME UNIT CONVERSIONS =====

/// Milliseconds per second.
pub const MS_PER_SECOND: u64 = 1000;

/// Seconds per minute.
pub const SECONDS_PER_MINUTE: u64 = 60;

/// Minutes per hour.
pub const MINUTES_PER_HOUR: u64 = 60;

/// Milliseconds per minute.
pub const MS_PER_MINUTE: u64 = MS_PER_SECOND * SECONDS_PER_MINUTE;

/// Milliseconds per hour.
pub const MS_PER_HOUR: u64 = MS_PER_MINUTE * MINUTES_PER_HOUR;

// ===== ENGINE WINDOWS =====

/// Minimum time between two alerts for the same sensor and level (minutes).
///
/// Sensors are read every few minutes; without a cooldown a sustained
/// breach would notify on every cycle.
pub const DEFAULT_COOLDOWN_MINUTES: u64 = 30;

/// History window used for trend estimation (hours).
pub const DEFAULT_LOOKBACK_HOURS: u64 = 24;

/// Default period between two analysis cycles (minutes).
pub const DEFAULT_CYCLE_INTERVAL_MINUTES: u64 = 5;

/// Default per-channel notification timeout (seconds).
pub const DEFAULT_CHANNEL_TIMEOUT_SECS: u64 = 5;
