//! Time management for the analysis engine
//!
//! Provides clock abstraction so the cooldown gate and the monitor never read
//! the wall clock directly:
//! - System clock for production
//! - Mock clock for deterministic tests (pre-seeded cooldowns, elapsed windows)

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::constants::time::MS_PER_HOUR;

/// Timestamp in milliseconds since the Unix epoch
pub type Timestamp = u64;

/// Source of time for the system
pub trait TimeSource: Send + Sync {
    /// Get current timestamp in milliseconds
    fn now(&self) -> Timestamp;

    /// Check if this source provides wall clock time (vs simulated)
    fn is_wall_clock(&self) -> bool;
}

/// System time source
#[derive(Debug, Clone, Default)]
pub struct SystemTime;

impl TimeSource for SystemTime {
    fn now(&self) -> Timestamp {
        use std::time::{SystemTime as StdSystemTime, UNIX_EPOCH};

        let elapsed = StdSystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
        Timestamp::try_from(elapsed.as_millis()).unwrap_or(Timestamp::MAX)
    }

    fn is_wall_clock(&self) -> bool {
        true
    }
}

/// Controllable time source for testing
///
/// Clones share the same clock, so a test can keep a handle and advance
/// time while the engine holds another.
#[derive(Debug, Clone, Default)]
pub struct MockTimeSource {
    timestamp: Arc<AtomicU64>,
}

impl MockTimeSource {
    pub fn new(timestamp: Timestamp) -> Self {
        Self {
            timestamp: Arc::new(AtomicU64::new(timestamp)),
        }
    }

    pub fn set(&self, timestamp: Timestamp) {
        self.timestamp.store(timestamp, Ordering::SeqCst);
    }

    pub fn advance(&self, ms: u64) {
        self.timestamp.fetch_add(ms, Ordering::SeqCst);
    }
}

impl TimeSource for MockTimeSource {
    fn now(&self) -> Timestamp {
        self.timestamp.load(Ordering::SeqCst)
    }

    fn is_wall_clock(&self) -> bool {
        false
    }
}

/// Hours elapsed between two timestamps (negative if `later` precedes `earlier`)
pub fn hours_between(earlier: Timestamp, later: Timestamp) -> f64 {
    (later as f64 - earlier as f64) / MS_PER_HOUR as f64
}
