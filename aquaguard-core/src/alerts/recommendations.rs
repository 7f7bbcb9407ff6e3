//! Remediation steps attached to alert notifications
//!
//! The step list depends on the sensor and on which side of its optimal band
//! the value sits.

use crate::readings::parameters;
use crate::thresholds::ThresholdSet;

use super::Alert;

/// Shown when a sensor has no specific guidance
pub const FALLBACK_RECOMMENDATION: &str = "Monitor situation closely";

const PH_UP: &[&str] = &[
    "Add pH Up solution slowly (0.2 units at a time)",
    "Wait 30 minutes and retest",
    "Check if nutrient solution is old (replace if needed)",
    "Verify calibration of pH sensor",
];

const PH_DOWN: &[&str] = &[
    "Add pH Down solution slowly (0.2 units at a time)",
    "Wait 30 minutes and retest",
    "Check aeration (high pH can indicate CO2 depletion)",
    "Verify calibration of pH sensor",
];

const DO_UP: &[&str] = &[
    "IMMEDIATE: Increase aeration (add air stones)",
    "Check water temperature (warmer = less DO)",
    "Reduce feeding if fish present",
    "Check for dead organisms in system",
    "Verify air pump is working",
    "If fish gasping at surface: 50% water change NOW",
];

const EC_UP: &[&str] = &[
    "Add nutrient solution",
    "Check plants for deficiency symptoms",
    "Verify EC sensor calibration",
];

const EC_DOWN: &[&str] = &[
    "Add fresh water to dilute",
    "Check for salt buildup",
    "Flush system if EC very high",
    "Reduce nutrient dosing",
];

const HEAT: &[&str] = &[
    "Turn on water heater",
    "Check heater is functioning",
    "Insulate reservoir/tanks",
    "Check ambient temperature",
];

const COOL: &[&str] = &[
    "Turn off heater",
    "Increase ventilation/cooling",
    "Add ice packs if emergency",
    "Consider chiller for long-term solution",
];

const REFILL: &[&str] = &[
    "Check for leaks",
    "Refill reservoir",
    "Verify auto top-off system working",
    "Check pump for proper operation",
];

/// Steps for `alert`, never empty
///
/// `thresholds` is the sensor's alert set; without an optimal band the value
/// is treated as above it.
pub fn recommendations_for(alert: &Alert, thresholds: Option<&ThresholdSet>) -> Vec<&'static str> {
    let below_optimal = thresholds
        .and_then(|t| t.optimal_low)
        .map_or(false, |low| alert.value < low);
    let sensor = alert.sensor.as_str();

    let steps: &[&str] = match sensor {
        parameters::PH if below_optimal => PH_UP,
        parameters::PH => PH_DOWN,
        parameters::DISSOLVED_OXYGEN if below_optimal => DO_UP,
        parameters::DISSOLVED_OXYGEN => &[],
        parameters::EC if below_optimal => EC_UP,
        parameters::EC => EC_DOWN,
        parameters::WATER_LEVEL => REFILL,
        s if s.contains("temp") && below_optimal => HEAT,
        s if s.contains("temp") => COOL,
        _ => &[],
    };

    if steps.is_empty() {
        vec![FALLBACK_RECOMMENDATION]
    } else {
        steps.to_vec()
    }
}
