//! Single-Parameter and Holistic Diagnosis
//!
//! Explains a reading in grower terms: how bad it is, how soon to act, what
//! is probably wrong and what to do. Unlike the trend-aware
//! [`correlation`](crate::correlation) engine, everything here works from the
//! current readings alone.
//!
//! ## Bands
//!
//! | Parameter   | critical | warning  | good        | warning   | critical |
//! |-------------|----------|----------|-------------|-----------|----------|
//! | pH          | < 6.0    | < 6.5    | 6.5 – 7.5   | < 8.5     | ≥ 8.5    |
//! | Temperature | < 15     | < 18     | 18 – 24     | < 28      | ≥ 28     |
//! | DO (mg/L)   | < 4      | < 6      | 6 – 9 (and above, supersaturated) |   |   |

use serde::{Deserialize, Serialize};

use crate::constants::water::{
    max_do_capacity, DO_CASCADE_MAX, DO_CRITICAL_LOW, DO_SAFE_MIN, DO_SUPERSATURATED, PH_BIOFILTER_MIN,
    PH_CRITICAL_HIGH, PH_CRITICAL_LOW, PH_HEALTHY_MAX, TEMP_CRITICAL_HIGH_C, TEMP_CRITICAL_LOW_C,
    TEMP_HEALTHY_MAX_C, TEMP_HEALTHY_MIN_C, TEMP_WARM_C,
};
use crate::readings::parameters;

/// Health of a single reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterStatus {
    Good,
    Warning,
    Critical,
}

/// How soon the grower should act
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Normal,
    Soon,
    Immediate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterAssessment {
    pub parameter: String,
    pub value: f64,
    pub status: ParameterStatus,
    pub urgency: Urgency,
    pub problems: Vec<String>,
    pub actions: Vec<String>,
    pub explanation: String,
}

impl ParameterAssessment {
    fn new(
        parameter: &str,
        value: f64,
        status: ParameterStatus,
        urgency: Urgency,
        problems: &[&str],
        actions: &[&str],
        explanation: String,
    ) -> Self {
        Self {
            parameter: parameter.to_string(),
            value,
            status,
            urgency,
            problems: problems.iter().map(|s| s.to_string()).collect(),
            actions: actions.iter().map(|s| s.to_string()).collect(),
            explanation,
        }
    }
}

pub fn assess_ph(value: f64) -> ParameterAssessment {
    use ParameterStatus::*;

    if value < PH_CRITICAL_LOW {
        ParameterAssessment::new(
            parameters::PH,
            value,
            Critical,
            Urgency::Immediate,
            &[
                "pH dangerously low",
                "Biofilter efficiency severely reduced (<50%)",
                "Fish stress increasing",
                "Ammonia toxicity risk rising",
            ],
            &[
                "IMMEDIATE: Add 3 tsp sodium bicarbonate per 5 gallons",
                "Stop feeding for 24 hours (reduce CO2)",
                "Test ammonia within 1 hour",
                "Increase aeration by 50%",
                "Monitor pH every 2 hours until above 6.5",
            ],
            format!(
                "pH of {value:.2} is in the critical zone and is likely driving a cascade. \
                 Raise it now to protect the biofilter bacteria."
            ),
        )
    } else if value < PH_BIOFILTER_MIN {
        ParameterAssessment::new(
            parameters::PH,
            value,
            Warning,
            Urgency::Soon,
            &[
                "pH below optimal for biofilter (wants 7.0-8.5)",
                "Nitrification running at 50-70% efficiency",
                "pH likely to continue dropping",
            ],
            &[
                "Add 2 tsp potassium carbonate per 5 gallons",
                "Reduce feeding by 25% temporarily",
                "Test pH again in 6 hours",
                "Target: 6.5-7.0 for lettuce systems",
            ],
            format!("At {value:.2} the biofilter is stressed but working. Act within 24 hours."),
        )
    } else if value <= PH_HEALTHY_MAX {
        ParameterAssessment::new(
            parameters::PH,
            value,
            Good,
            Urgency::Normal,
            &[],
            &["Continue normal operations", "Monitor daily", "No immediate action needed"],
            format!("pH of {value:.2} suits both lettuce and the biofilter."),
        )
    } else if value < PH_CRITICAL_HIGH {
        ParameterAssessment::new(
            parameters::PH,
            value,
            Warning,
            Urgency::Soon,
            &[
                "pH higher than optimal for lettuce",
                "Some nutrients becoming unavailable",
                "Ammonia toxicity increasing (NH3 form)",
            ],
            &[
                "Test ammonia immediately",
                "Reduce/stop lime additions",
                "Consider adding citric acid (pH down)",
                "Target: lower to 7.0-7.5",
            ],
            format!("At {value:.2} nutrients start precipitating out of solution."),
        )
    } else {
        ParameterAssessment::new(
            parameters::PH,
            value,
            Critical,
            Urgency::Immediate,
            &[
                "pH dangerously high",
                "Iron, manganese becoming unavailable",
                "NH3 toxicity risk",
                "Possible lime overdose",
            ],
            &[
                "IMMEDIATE: Add pH down (citric acid)",
                "Test ammonia - if high, partial water change",
                "Stop all lime additions",
                "Monitor every hour until below 8.0",
            ],
            format!("pH of {value:.2} is critical. Plants cannot take up nutrients."),
        )
    }
}

pub fn assess_temperature(value: f64) -> ParameterAssessment {
    use ParameterStatus::*;

    if value < TEMP_CRITICAL_LOW_C {
        ParameterAssessment::new(
            parameters::TEMPERATURE,
            value,
            Critical,
            Urgency::Soon,
            &["Too cold - growth will stop", "Risk of root disease"],
            &[
                "Add aquarium heater (50W per 10 gallons)",
                "Insulate reservoir",
                "Target: 18-22°C",
            ],
            format!("At {value:.1}°C lettuce growth is severely stunted."),
        )
    } else if value < TEMP_HEALTHY_MIN_C {
        ParameterAssessment::new(
            parameters::TEMPERATURE,
            value,
            Warning,
            Urgency::Normal,
            &["Below optimal - slow growth"],
            &["Consider gentle heating", "Monitor growth rate", "Acceptable but not ideal"],
            format!("At {value:.1}°C growth is slower than optimal but acceptable."),
        )
    } else if value <= TEMP_HEALTHY_MAX_C {
        ParameterAssessment::new(
            parameters::TEMPERATURE,
            value,
            Good,
            Urgency::Normal,
            &[],
            &["Continue monitoring", "No action needed"],
            format!("{value:.1}°C is ideal for lettuce."),
        )
    } else if value < TEMP_CRITICAL_HIGH_C {
        ParameterAssessment::new(
            parameters::TEMPERATURE,
            value,
            Warning,
            Urgency::Soon,
            &["Getting warm - check DO", "Plants may bolt (flower prematurely)"],
            &[
                "Check dissolved oxygen (should be >6 mg/L)",
                "Increase aeration if DO dropping",
                "Consider shading reservoir",
                "Monitor for bolting (flowering)",
            ],
            format!("At {value:.1}°C watch for stress; lettuce prefers cooler water."),
        )
    } else {
        ParameterAssessment::new(
            parameters::TEMPERATURE,
            value,
            Critical,
            Urgency::Immediate,
            &["Too hot - lettuce will bolt", "DO crash risk"],
            &[
                "URGENT: Cool system (ice bottles, shade)",
                "Check DO immediately",
                "Consider switching to heat-tolerant species",
                "Harvest lettuce before it bolts",
            ],
            format!("At {value:.1}°C lettuce is stressed and will likely bolt soon."),
        )
    }
}

pub fn assess_do(value: f64) -> ParameterAssessment {
    use ParameterStatus::*;

    if value < DO_CRITICAL_LOW {
        ParameterAssessment::new(
            parameters::DISSOLVED_OXYGEN,
            value,
            Critical,
            Urgency::Immediate,
            &[
                "Fish will die within hours",
                "Biofilter bacteria dying",
                "Root rot starting in plants",
            ],
            &[
                "EMERGENCY: Add air stone/aerator NOW",
                "Reduce feeding to zero",
                "Check for dead zones in system",
                "Partial water change with aerated water",
                "Check pump - may be failing",
            ],
            format!("DO of {value:.1} mg/L is life-threatening. This is an emergency."),
        )
    } else if value < DO_SAFE_MIN {
        ParameterAssessment::new(
            parameters::DISSOLVED_OXYGEN,
            value,
            Warning,
            Urgency::Soon,
            &[
                "Below safe threshold for most fish",
                "Biofilter efficiency reduced",
                "Fish showing stress behaviors",
            ],
            &[
                "Increase aeration immediately",
                "Check water temperature (high temp = low DO)",
                "Reduce feeding by 50%",
                "Target: >6 mg/L minimum",
            ],
            format!("DO of {value:.1} mg/L is marginal. Fish are stressed."),
        )
    } else if value <= DO_SUPERSATURATED {
        ParameterAssessment::new(
            parameters::DISSOLVED_OXYGEN,
            value,
            Good,
            Urgency::Normal,
            &[],
            &["Maintain current aeration", "Monitor daily"],
            format!("DO of {value:.1} mg/L is excellent. System is well-aerated."),
        )
    } else {
        ParameterAssessment::new(
            parameters::DISSOLVED_OXYGEN,
            value,
            Good,
            Urgency::Normal,
            &[],
            &["Monitor for gas bubble disease (rare)"],
            format!("DO of {value:.1} mg/L is supersaturated. Usually not a problem."),
        )
    }
}

/// Overall verdict of a holistic diagnosis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
    Excellent,
    Good,
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HolisticAssessment {
    pub overall_status: OverallStatus,
    pub root_cause: Option<String>,
    pub cascading_effects: Vec<String>,
    pub priority_actions: Vec<String>,
    pub explanation: String,
}

impl Default for HolisticAssessment {
    fn default() -> Self {
        Self {
            overall_status: OverallStatus::Good,
            root_cause: None,
            cascading_effects: Vec::new(),
            priority_actions: Vec::new(),
            explanation: String::new(),
        }
    }
}

fn owned(lines: &[&str]) -> Vec<String> {
    lines.iter().map(|s| s.to_string()).collect()
}

/// Diagnose the system from current pH, temperature and DO
///
/// Checks run in order and the first match is returned. A check that needs
/// a missing reading does not match.
pub fn assess_holistic(ph: Option<f64>, temperature: Option<f64>, dissolved_oxygen: Option<f64>) -> HolisticAssessment {
    let ph_below = |limit: f64| ph.map_or(false, |v| v < limit);
    let do_below = |limit: f64| dissolved_oxygen.map_or(false, |v| v < limit);
    let do_at_least = |limit: f64| dissolved_oxygen.map_or(false, |v| v >= limit);

    if ph_below(PH_BIOFILTER_MIN) && do_below(DO_SAFE_MIN) {
        return HolisticAssessment {
            overall_status: OverallStatus::Critical,
            root_cause: Some("Biofilter failure causing cascade".to_string()),
            cascading_effects: owned(&[
                "Low pH inhibits nitrification",
                "Poor nitrification -> excess CO2",
                "CO2 displaces oxygen",
                "Low oxygen -> fish stress -> less eating",
                "Downward spiral in progress",
            ]),
            priority_actions: owned(&[
                "1. FIRST: Raise pH (fixes root cause)",
                "2. THEN: Increase aeration (addresses symptom)",
                "3. Stop feeding 24h (breaks cycle)",
                "4. Monitor ammonia (biofilter compromised)",
                "5. Expected recovery: 48-72 hours",
            ]),
            explanation: "Classic biofilter crash. Low pH started it and DO followed. Fix pH first.".to_string(),
        };
    }

    if let (Some(temp), true) = (temperature.filter(|t| *t > TEMP_WARM_C), do_below(DO_CASCADE_MAX)) {
        return HolisticAssessment {
            overall_status: OverallStatus::Warning,
            root_cause: Some("Temperature too high for DO saturation".to_string()),
            cascading_effects: vec![
                "Warm water holds less oxygen".to_string(),
                format!("At {temp:.1}°C, saturation is only ~{:.1} mg/L", max_do_capacity(temp)),
                "Current aeration insufficient for temperature".to_string(),
            ],
            priority_actions: owned(&[
                "1. FIRST: Cool water (ice bottles, shade)",
                "2. THEN: Increase aeration 50%",
                "3. Reduce feeding (less oxygen demand)",
                "4. This will fix both problems",
            ]),
            explanation: format!("{temp:.1}°C is holding DO down. Cool first and DO will recover on its own."),
        };
    }

    let all_good = ph.map_or(false, |v| (PH_BIOFILTER_MIN..=PH_HEALTHY_MAX).contains(&v))
        && do_at_least(DO_SAFE_MIN)
        && temperature.map_or(false, |v| (TEMP_HEALTHY_MIN_C..=TEMP_HEALTHY_MAX_C).contains(&v));
    if all_good {
        return HolisticAssessment {
            overall_status: OverallStatus::Excellent,
            priority_actions: owned(&["Continue current management", "Maintain monitoring schedule"]),
            explanation: "All parameters in optimal ranges. System is healthy.".to_string(),
            ..HolisticAssessment::default()
        };
    }

    if ph_below(PH_BIOFILTER_MIN) && do_at_least(DO_SAFE_MIN) {
        return HolisticAssessment {
            root_cause: Some("pH declining (but caught early)".to_string()),
            priority_actions: owned(&[
                "1. Raise pH now (before it affects biofilter)",
                "2. DO and temp are good - pH is only issue",
                "3. Easy fix if done promptly",
            ]),
            explanation: "Only pH is low, caught before it cascades. Fix it today.".to_string(),
            ..HolisticAssessment::default()
        };
    }

    HolisticAssessment::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ph_bands() {
        let cases = [
            (5.8, ParameterStatus::Critical, Urgency::Immediate),
            (6.2, ParameterStatus::Warning, Urgency::Soon),
            (6.5, ParameterStatus::Good, Urgency::Normal),
            (7.5, ParameterStatus::Good, Urgency::Normal),
            (7.8, ParameterStatus::Warning, Urgency::Soon),
            (8.0, ParameterStatus::Warning, Urgency::Soon),
            (8.2, ParameterStatus::Warning, Urgency::Soon),
            (8.5, ParameterStatus::Critical, Urgency::Immediate),
        ];
        for (value, status, urgency) in cases {
            let result = assess_ph(value);
            assert_eq!((result.status, result.urgency), (status, urgency), "pH {value}");
        }
    }

    #[test]
    fn alkaline_water_escalates_at_eight_and_a_half() {
        let high = assess_ph(8.49);
        assert_eq!(high.status, ParameterStatus::Warning);
        assert!(high.actions.contains(&"Reduce/stop lime additions".to_string()));

        let critical = assess_ph(8.7);
        assert_eq!(critical.status, ParameterStatus::Critical);
        assert_eq!(critical.actions[0], "IMMEDIATE: Add pH down (citric acid)");
    }

    #[test]
    fn cold_is_critical_but_not_immediate() {
        let result = assess_temperature(12.0);
        assert_eq!(result.status, ParameterStatus::Critical);
        assert_eq!(result.urgency, Urgency::Soon);
        assert_eq!(assess_temperature(16.0).status, ParameterStatus::Warning);
        assert_eq!(assess_temperature(21.0).status, ParameterStatus::Good);
        assert_eq!(assess_temperature(28.0).urgency, Urgency::Immediate);
    }

    #[test]
    fn supersaturated_do_is_good() {
        assert_eq!(assess_do(3.5).status, ParameterStatus::Critical);
        assert_eq!(assess_do(5.0).status, ParameterStatus::Warning);
        let high = assess_do(11.0);
        assert_eq!(high.status, ParameterStatus::Good);
        assert!(high.explanation.contains("supersaturated"));
        assert!(high.problems.is_empty());
    }

    #[test]
    fn holistic_biofilter_crash_first() {
        let result = assess_holistic(Some(6.2), Some(27.0), Some(5.5));
        assert_eq!(result.overall_status, OverallStatus::Critical);
        assert_eq!(result.priority_actions.len(), 5);
    }

    #[test]
    fn holistic_warm_water() {
        let result = assess_holistic(Some(7.0), Some(26.0), Some(6.5));
        assert_eq!(result.overall_status, OverallStatus::Warning);
        assert!(result.cascading_effects[1].contains("~7.8 mg/L"));
    }

    #[test]
    fn holistic_excellent_and_fallbacks() {
        assert_eq!(
            assess_holistic(Some(7.0), Some(21.0), Some(7.5)).overall_status,
            OverallStatus::Excellent
        );

        let ph_only = assess_holistic(Some(6.3), Some(21.0), Some(7.0));
        assert_eq!(ph_only.overall_status, OverallStatus::Good);
        assert!(ph_only.root_cause.is_some());

        assert_eq!(assess_holistic(None, None, None), HolisticAssessment::default());
    }
}
