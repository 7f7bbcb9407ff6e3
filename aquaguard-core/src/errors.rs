//! Error Types for Configuration and Reading Sources
//!
//! ## Design Philosophy
//!
//! The analysis engine distinguishes two kinds of failure:
//!
//! 1. **Fatal at load time**: A threshold table whose boundaries are out of
//!    order is a deployment mistake. It is rejected once, when the table is
//!    loaded, and never re-checked per cycle.
//!
//! 2. **Recoverable per cycle**: A sensor that cannot be read or a history
//!    query that fails only affects that parameter for the current cycle.
//!    The monitor logs the error and carries on with the other parameters.
//!
//! Numeric degeneracies (zero regression denominator, zero mean) are not
//! errors at all. They degrade to a zero slope or `unknown` volatility.
//!
//! ## Error Handling Strategy
//!
//! ```rust
//! use aquaguard_core::{ConfigError, ThresholdTable};
//!
//! let json = r#"{ "ph": { "critical_low": 7.0, "warning_low": 6.0 } }"#;
//! match ThresholdTable::from_json_str(json) {
//!     Ok(_) => unreachable!(),
//!     Err(ConfigError::Ordering { parameter, .. }) => {
//!         // Refuse to start: fix the configuration file
//!         assert_eq!(parameter, "ph");
//!     }
//!     Err(other) => panic!("unexpected: {other}"),
//! }
//! ```

use thiserror::Error;

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for reading source queries
pub type SourceResult<T> = Result<T, SourceError>;

/// Configuration errors - fatal at startup
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Two boundaries of a threshold set are not in ascending order
    #[error("Thresholds for {parameter}: {lower} ({lower_value}) must be below {upper} ({upper_value})")]
    Ordering {
        /// Parameter whose threshold set is malformed
        parameter: String,
        /// Name of the boundary that should be lower
        lower: &'static str,
        /// Value of the lower boundary
        lower_value: f64,
        /// Name of the boundary that should be higher
        upper: &'static str,
        /// Value of the higher boundary
        upper_value: f64,
    },

    /// A boundary is NaN or infinite
    #[error("Thresholds for {parameter}: {boundary} is not a finite number")]
    NonFinite {
        /// Parameter whose threshold set is malformed
        parameter: String,
        /// Name of the offending boundary
        boundary: &'static str,
    },

    /// A setting is out of its valid range
    #[error("Invalid setting {name}: {reason}")]
    InvalidSetting {
        /// Setting name
        name: &'static str,
        /// Why it was rejected
        reason: &'static str,
    },

    /// JSON could not be parsed
    #[error("Malformed configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// Configuration file could not be read
    #[error("Cannot read configuration: {0}")]
    Io(#[from] std::io::Error),
}

/// Reading source errors - recoverable, scoped to one parameter
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SourceError {
    /// Sensor hardware did not answer
    #[error("Sensor {0} unavailable")]
    Unavailable(String),

    /// History store query failed
    #[error("History query for {parameter} failed: {reason}")]
    Query {
        /// Parameter being queried
        parameter: String,
        /// Backend-specific failure description
        reason: String,
    },
}
