//! Cooldown gate for alerts
//!
//! Remembers when each `(sensor, level)` pair last produced an accepted
//! alert. A new alert for the same pair inside the cooldown window is
//! dropped; outside it, the alert is accepted and the pair's timestamp is
//! overwritten.
//!
//! Warning and critical occupy different keys: a sensor escalating from
//! warning to critical is not held back by the earlier warning.
//!
//! Check and record happen under one lock, so two overlapping cycles cannot
//! both accept the same alert.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::constants::time::{DEFAULT_COOLDOWN_MINUTES, MS_PER_MINUTE};
use crate::time::Timestamp;

use super::{Alert, AlertLevel};

type AlertKey = (String, AlertLevel);

/// Lock-protected last-sent map with a cooldown window
#[derive(Debug)]
pub struct AlertHistory {
    cooldown_ms: u64,
    last_sent: Mutex<HashMap<AlertKey, Timestamp>>,
}

impl Default for AlertHistory {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_COOLDOWN_MINUTES * MS_PER_MINUTE))
    }
}

impl AlertHistory {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown_ms: u64::try_from(cooldown.as_millis()).unwrap_or(u64::MAX),
            last_sent: Mutex::new(HashMap::new()),
        }
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    /// Accept `alert` unless its key fired less than one cooldown before `now`
    ///
    /// Acceptance records `now` for the key.
    pub fn admit(&self, alert: &Alert, now: Timestamp) -> bool {
        let mut last_sent = self.lock();
        let key = (alert.sensor.clone(), alert.level);

        if let Some(previous) = last_sent.get(&key) {
            if now.saturating_sub(*previous) < self.cooldown_ms {
                log::debug!(
                    "Suppressing {} alert for {}: last sent {} ms ago",
                    alert.level.name(),
                    alert.sensor,
                    now.saturating_sub(*previous)
                );
                return false;
            }
        }

        last_sent.insert(key, now);
        true
    }

    /// Keep only the alerts the gate accepts, in order
    pub fn filter(&self, alerts: Vec<Alert>, now: Timestamp) -> Vec<Alert> {
        alerts.into_iter().filter(|alert| self.admit(alert, now)).collect()
    }

    /// When the pair last fired, if ever
    pub fn last_sent(&self, sensor: &str, level: AlertLevel) -> Option<Timestamp> {
        self.lock().get(&(sensor.to_string(), level)).copied()
    }

    /// Pre-load a last-sent time, e.g. restored from a previous run
    pub fn seed(&self, sensor: &str, level: AlertLevel, timestamp: Timestamp) {
        self.lock().insert((sensor.to_string(), level), timestamp);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // The map stays consistent even if a holder panicked mid-insert
    fn lock(&self) -> MutexGuard<'_, HashMap<AlertKey, Timestamp>> {
        self.last_sent.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
