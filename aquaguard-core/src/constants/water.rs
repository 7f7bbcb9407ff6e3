//! Water-Quality Bands
//!
//! Bounds used by the multi-parameter diagnosis patterns and the
//! single-parameter assessments. Values come from aquaponics practice for
//! a nitrifying biofilter, leafy greens and cold-to-temperate fish.

// ===== pH =====

/// Below this pH nitrification slows and the biofilter is at risk.
pub const PH_BIOFILTER_MIN: f64 = 6.5;

/// Upper edge of the healthy pH band.
pub const PH_HEALTHY_MAX: f64 = 7.5;

/// pH below this is critical.
pub const PH_CRITICAL_LOW: f64 = 6.0;

/// pH at or above this is critical.
pub const PH_CRITICAL_HIGH: f64 = 8.5;

// ===== TEMPERATURE (°C) =====

/// Temperature above which the temperature-oxygen cascade is considered.
pub const TEMP_CASCADE_MIN_C: f64 = 25.0;

/// Temperature above which DO saturation becomes the holistic root cause.
pub const TEMP_WARM_C: f64 = 24.0;

/// Lower edge of the healthy temperature band.
pub const TEMP_HEALTHY_MIN_C: f64 = 18.0;

/// Upper edge of the healthy temperature band.
pub const TEMP_HEALTHY_MAX_C: f64 = 24.0;

/// Below this temperature growth stops.
pub const TEMP_CRITICAL_LOW_C: f64 = 15.0;

/// At or above this temperature lettuce bolts and DO crashes.
pub const TEMP_CRITICAL_HIGH_C: f64 = 28.0;

// ===== DISSOLVED OXYGEN (mg/L) =====

/// Below this DO the cascade patterns consider oxygen falling short.
pub const DO_CASCADE_MAX: f64 = 7.0;

/// Minimum DO for fish comfort.
pub const DO_SAFE_MIN: f64 = 6.0;

/// DO below this is life-threatening.
pub const DO_CRITICAL_LOW: f64 = 4.0;

/// DO above this is supersaturated.
pub const DO_SUPERSATURATED: f64 = 9.0;

/// Approximate DO saturation at 20 °C (mg/L).
pub const DO_SATURATION_AT_20C: f64 = 9.0;

/// Approximate loss of DO saturation per °C above 20 °C (mg/L).
pub const DO_SATURATION_LOSS_PER_C: f64 = 0.2;

/// Rough maximum dissolved oxygen the water can hold at `temp_c`.
pub fn max_do_capacity(temp_c: f64) -> f64 {
    DO_SATURATION_AT_20C - (temp_c - 20.0) * DO_SATURATION_LOSS_PER_C
}
