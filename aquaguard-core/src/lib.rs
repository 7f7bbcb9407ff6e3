//! Analysis engine for AquaGuard
//!
//! Classifies aquaponics water-quality readings against thresholds, fits
//! trends to recent history, predicts when a parameter will cross its next
//! boundary and infers multi-parameter root causes.
//!
//! Everything here is synchronous and free of I/O apart from reading
//! configuration files. Notification delivery and cycle scheduling live in
//! `aquaguard-connectors`.
//!
//! ```
//! use aquaguard_core::{AlertEvaluator, AlertHistory, AlertLevel, ThresholdTable};
//!
//! let table = ThresholdTable::alert_defaults();
//! let history = AlertHistory::default();
//!
//! let alert = AlertEvaluator::new()
//!     .evaluate("ph", 4.8, table.get("ph").unwrap(), 0)
//!     .unwrap();
//! assert_eq!(alert.level, AlertLevel::Critical);
//!
//! // First alert goes out, the repeat a minute later does not
//! assert!(history.admit(&alert, 0));
//! assert!(!history.admit(&alert, 60_000));
//! ```

#![deny(unsafe_code)]

pub mod alerts;
pub mod config;
pub mod constants;
pub mod correlation;
pub mod diagnosis;
pub mod errors;
pub mod prediction;
pub mod readings;
pub mod summary;
pub mod thresholds;
pub mod time;
pub mod trend;

// Public API
pub use alerts::{Alert, AlertEvaluator, AlertHistory, AlertLevel};
pub use config::EngineConfig;
pub use correlation::{CorrelationEngine, CorrelationInput, CorrelationResult, PatternKind, SystemState};
pub use diagnosis::{assess_do, assess_holistic, assess_ph, assess_temperature, HolisticAssessment, ParameterAssessment};
pub use errors::{ConfigError, ConfigResult, SourceError, SourceResult};
pub use prediction::{ConcernLevel, ThresholdCrossingPredictor};
pub use readings::{MemorySource, Reading, ReadingSource, Sample};
pub use summary::{TrendSummary, UrgentAction};
pub use thresholds::{ThresholdSet, ThresholdTable};
pub use time::{MockTimeSource, SystemTime, TimeSource, Timestamp};
pub use trend::{TrendDirection, TrendEstimator, TrendResult};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
