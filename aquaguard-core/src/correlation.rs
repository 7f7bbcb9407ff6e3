//! Multi-Parameter Correlation and Root-Cause Inference
//!
//! ## Overview
//!
//! Single-parameter alerts say *what* is out of range. Aquaponic failures
//! rarely stay in one parameter, though: a struggling biofilter drags pH
//! down, the excess CO2 pushes oxygen out, fish stop eating and the bacteria
//! starve. Fixing the symptom (aeration) without the cause (pH) loses the
//! system anyway.
//!
//! This module matches current readings and trends against known failure
//! cascades and returns the root cause, the effect chain and interventions
//! in the order they must happen.
//!
//! ## Patterns
//!
//! Patterns are an ordered list. The first one whose predicate holds wins,
//! even when a later one would also match:
//!
//! | # | Pattern                    | Predicate                                              |
//! |---|----------------------------|--------------------------------------------------------|
//! | 1 | Biofilter collapse         | pH < 6.5 falling, DO < 7 falling                       |
//! | 2 | Temperature-oxygen cascade | temp > 25 rising, DO < 7 falling                       |
//! | 3 | Predictive pH warning      | pH falling with warning/critical concern               |
//! | 4 | Optimal and stable         | 6.5 ≤ pH ≤ 7.5, 18 ≤ temp ≤ 24, DO ≥ 6, all stable    |
//!
//! No match means no root cause; callers fall back to single-parameter
//! alerts and trend concerns.
//!
//! A predicate that needs a reading or trend the cycle does not have is
//! false.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::water::{
    max_do_capacity, DO_CASCADE_MAX, DO_SAFE_MIN, PH_BIOFILTER_MIN, PH_HEALTHY_MAX, TEMP_CASCADE_MIN_C,
    TEMP_HEALTHY_MAX_C, TEMP_HEALTHY_MIN_C,
};
use crate::readings::parameters;
use crate::trend::TrendResult;

/// Deadline assumed for the predictive pH pattern when the trend has none (hours)
const DEFAULT_PH_DEADLINE_HOURS: f64 = 24.0;

/// Current value and trend of one parameter
#[derive(Debug, Clone, Copy, Default)]
pub struct ParameterState<'a> {
    pub value: Option<f64>,
    pub trend: Option<&'a TrendResult>,
}

impl<'a> ParameterState<'a> {
    pub fn new(value: Option<f64>, trend: Option<&'a TrendResult>) -> Self {
        Self { value, trend }
    }

    fn below(&self, limit: f64) -> bool {
        self.value.map_or(false, |v| v < limit)
    }

    fn above(&self, limit: f64) -> bool {
        self.value.map_or(false, |v| v > limit)
    }

    fn within(&self, low: f64, high: f64) -> bool {
        self.value.map_or(false, |v| (low..=high).contains(&v))
    }

    fn falling(&self) -> bool {
        self.trend.map_or(false, TrendResult::is_falling)
    }

    fn rising(&self) -> bool {
        self.trend.map_or(false, TrendResult::is_rising)
    }

    fn stable(&self) -> bool {
        self.trend.map_or(false, TrendResult::is_stable)
    }

    fn time_to_threshold(&self) -> Option<f64> {
        self.trend.and_then(|t| t.time_to_threshold)
    }

    fn rate(&self) -> f64 {
        self.trend.map_or(0.0, |t| t.rate_of_change)
    }
}

/// What the correlation engine looks at
#[derive(Debug, Clone, Copy, Default)]
pub struct CorrelationInput<'a> {
    pub ph: ParameterState<'a>,
    pub temperature: ParameterState<'a>,
    pub dissolved_oxygen: ParameterState<'a>,
}

impl<'a> CorrelationInput<'a> {
    /// Pick pH, temperature and DO out of a cycle's readings and trends
    pub fn from_cycle(readings: &BTreeMap<String, f64>, trends: &'a BTreeMap<String, TrendResult>) -> Self {
        let state = |name: &str| ParameterState::new(readings.get(name).copied(), trends.get(name));
        Self {
            ph: state(parameters::PH),
            temperature: state(parameters::TEMPERATURE),
            dissolved_oxygen: state(parameters::DISSOLVED_OXYGEN),
        }
    }
}

/// Named failure cascades, in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    BiofilterCollapse,
    TemperatureOxygenCascade,
    PredictivePhWarning,
    OptimalStable,
}

impl PatternKind {
    pub const fn name(&self) -> &'static str {
        match self {
            PatternKind::BiofilterCollapse => "biofilter_collapse",
            PatternKind::TemperatureOxygenCascade => "temperature_oxygen_cascade",
            PatternKind::PredictivePhWarning => "predictive_ph_warning",
            PatternKind::OptimalStable => "optimal_stable",
        }
    }
}

/// Overall state the correlation places the system in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemState {
    CriticalCascade,
    TemperatureOxygenCascade,
    PreventiveActionNeeded,
    OptimalStable,
    Unknown,
}

/// One step of a remediation plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intervention {
    pub order: u32,
    pub action: String,
    pub why: String,
    pub method: String,
}

impl Intervention {
    fn new(order: u32, action: impl Into<String>, why: &str, method: &str) -> Self {
        Self {
            order,
            action: action.into(),
            why: why.to_string(),
            method: method.to_string(),
        }
    }
}

/// Root-cause diagnosis for one cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationResult {
    pub pattern: Option<PatternKind>,
    pub root_cause: Option<String>,
    pub system_state: SystemState,
    pub cascading_effects: Vec<String>,
    pub intervention_priority: Vec<Intervention>,
    /// Binding urgency of the diagnosis (hours)
    pub time_to_critical: Option<f64>,
    pub explanation: String,
    pub predicted_outcome: String,
}

impl CorrelationResult {
    /// No pattern matched
    pub fn unmatched() -> Self {
        Self {
            pattern: None,
            root_cause: None,
            system_state: SystemState::Unknown,
            cascading_effects: Vec::new(),
            intervention_priority: Vec::new(),
            time_to_critical: None,
            explanation: String::new(),
            predicted_outcome: String::new(),
        }
    }
}

/// A named predicate and the diagnosis it produces
pub struct Pattern {
    pub kind: PatternKind,
    pub matches: fn(&CorrelationInput<'_>) -> bool,
    pub diagnose: fn(&CorrelationInput<'_>) -> CorrelationResult,
}

/// Evaluation order; the first matching pattern is authoritative
pub static PATTERNS: [Pattern; 4] = [
    Pattern {
        kind: PatternKind::BiofilterCollapse,
        matches: biofilter_collapse_matches,
        diagnose: biofilter_collapse,
    },
    Pattern {
        kind: PatternKind::TemperatureOxygenCascade,
        matches: temperature_oxygen_matches,
        diagnose: temperature_oxygen_cascade,
    },
    Pattern {
        kind: PatternKind::PredictivePhWarning,
        matches: predictive_ph_matches,
        diagnose: predictive_ph_warning,
    },
    Pattern {
        kind: PatternKind::OptimalStable,
        matches: optimal_stable_matches,
        diagnose: optimal_stable,
    },
];

/// Runs the pattern list over a cycle's readings and trends
#[derive(Debug, Clone, Copy, Default)]
pub struct CorrelationEngine;

impl CorrelationEngine {
    pub fn new() -> Self {
        Self
    }

    /// The first pattern whose predicate holds
    pub fn matching_pattern(&self, input: &CorrelationInput<'_>) -> Option<&'static Pattern> {
        PATTERNS.iter().find(|pattern| (pattern.matches)(input))
    }

    pub fn analyze(&self, input: &CorrelationInput<'_>) -> CorrelationResult {
        match self.matching_pattern(input) {
            Some(pattern) => {
                log::debug!("Correlation matched {}", pattern.kind.name());
                (pattern.diagnose)(input)
            }
            None => CorrelationResult::unmatched(),
        }
    }
}

fn min_present(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.min(y)),
        (x, y) => x.or(y),
    }
}

fn hours_text(hours: Option<f64>) -> String {
    hours.map_or_else(|| "unknown".to_string(), |h| format!("~{h:.1} hours"))
}

// ===== PATTERN 1: BIOFILTER COLLAPSE =====

fn biofilter_collapse_matches(input: &CorrelationInput<'_>) -> bool {
    input.ph.below(PH_BIOFILTER_MIN)
        && input.ph.falling()
        && input.dissolved_oxygen.below(DO_CASCADE_MAX)
        && input.dissolved_oxygen.falling()
}

fn biofilter_collapse(input: &CorrelationInput<'_>) -> CorrelationResult {
    let critical_hours = min_present(input.ph.time_to_threshold(), input.dissolved_oxygen.time_to_threshold());
    let deadline = hours_text(critical_hours);

    CorrelationResult {
        pattern: Some(PatternKind::BiofilterCollapse),
        root_cause: Some("Biofilter collapse cascade".to_string()),
        system_state: SystemState::CriticalCascade,
        cascading_effects: vec![
            "1. Low pH inhibits nitrifying bacteria".to_string(),
            "2. Bacteria produce less, consume less O2".to_string(),
            "3. Incomplete nitrification -> excess CO2".to_string(),
            "4. CO2 further lowers pH (positive feedback loop)".to_string(),
            "5. DO drops as CO2 displaces oxygen".to_string(),
            "6. Fish stress -> stop eating -> less waste".to_string(),
            "7. Bacteria starve -> die off accelerates".to_string(),
            "DOWNWARD SPIRAL ACTIVE".to_string(),
        ],
        intervention_priority: vec![
            Intervention::new(
                1,
                "IMMEDIATE: Raise pH to 7.0+",
                "Breaks the cascade at root cause",
                "Add 3 tsp sodium bicarbonate per 5 gal",
            ),
            Intervention::new(
                2,
                "IMMEDIATE: Maximize aeration",
                "Prevents fish death while pH recovers",
                "Add extra air stones, increase pump flow",
            ),
            Intervention::new(
                3,
                "Stop feeding for 24-48h",
                "Reduces CO2 production, gives bacteria time to recover",
                "No food until pH stable above 6.8",
            ),
            Intervention::new(
                4,
                "Monitor ammonia every 2 hours",
                "Biofilter compromised, ammonia may spike",
                "Test kit, be ready for emergency water change",
            ),
        ],
        time_to_critical: critical_hours,
        explanation: format!(
            "CRITICAL SYSTEM FAILURE IN PROGRESS. The biofilter is in a self-reinforcing collapse: \
             low pH makes the bacteria fail, which lowers pH further. Time to system failure: {deadline}. \
             Root cause: pH dropped below the biofilter threshold. \
             Effect chain: pH down -> bacteria fail -> CO2 up -> pH down further -> DO down -> crisis. \
             Raising pH is the only way to break the cycle; everything else is secondary."
        ),
        predicted_outcome: format!(
            "Without intervention: system failure in {deadline}, fish death likely. \
             With intervention: 48-72h recovery if pH is raised within the next 6 hours."
        ),
    }
}

// ===== PATTERN 2: TEMPERATURE-OXYGEN CASCADE =====

fn temperature_oxygen_matches(input: &CorrelationInput<'_>) -> bool {
    input.temperature.above(TEMP_CASCADE_MIN_C)
        && input.temperature.rising()
        && input.dissolved_oxygen.below(DO_CASCADE_MAX)
        && input.dissolved_oxygen.falling()
}

fn temperature_oxygen_cascade(input: &CorrelationInput<'_>) -> CorrelationResult {
    let temp = input.temperature.value.unwrap_or_default();
    let dissolved = input.dissolved_oxygen.value.unwrap_or_default();
    let capacity = max_do_capacity(temp);
    let critical_hours = min_present(
        input.temperature.time_to_threshold(),
        input.dissolved_oxygen.time_to_threshold(),
    );

    CorrelationResult {
        pattern: Some(PatternKind::TemperatureOxygenCascade),
        root_cause: Some("Temperature rising -> Oxygen capacity falling".to_string()),
        system_state: SystemState::TemperatureOxygenCascade,
        cascading_effects: vec![
            format!("1. Water temp at {temp:.1}°C (high)"),
            "2. Oxygen saturation capacity decreasing".to_string(),
            format!("3. At {temp:.1}°C, max DO only ~{capacity:.1} mg/L"),
            format!("4. Current DO: {dissolved:.1} mg/L"),
            "5. Fish metabolism increases with temp (need MORE O2)".to_string(),
            "6. Available oxygen decreases (can provide LESS O2)".to_string(),
            "7. Mismatch growing -> stress increasing".to_string(),
        ],
        intervention_priority: vec![
            Intervention::new(
                1,
                "Cool water immediately",
                "Root cause - fixes DO capacity",
                "Add frozen water bottles, shade reservoir, reduce light hours",
            ),
            Intervention::new(
                2,
                "Increase aeration 50%",
                "Compensates while cooling",
                "Additional air stones or venturi",
            ),
            Intervention::new(
                3,
                "Reduce feeding by 50%",
                "Lowers oxygen demand",
                "Feed less until temp below 24°C",
            ),
        ],
        time_to_critical: critical_hours,
        explanation: format!(
            "TEMPERATURE-OXYGEN CRISIS DEVELOPING. Rising temperature lowers how much oxygen the water \
             can hold while making fish need more of it. Root cause: rising temperature. \
             Time to critical: {}. Fix temperature first; DO will recover as the water cools.",
            hours_text(critical_hours)
        ),
        predicted_outcome: format!(
            "Without cooling, DO keeps falling toward the ~{capacity:.1} mg/L ceiling and fish stress grows. \
             With cooling and extra aeration, DO recovers as temperature drops below 24°C."
        ),
    }
}

// ===== PATTERN 3: PREDICTIVE pH WARNING =====

fn predictive_ph_matches(input: &CorrelationInput<'_>) -> bool {
    input.ph.falling() && input.ph.trend.map_or(false, |t| t.concern_level.is_urgent())
}

fn predictive_ph_warning(input: &CorrelationInput<'_>) -> CorrelationResult {
    let hours = input.ph.time_to_threshold().unwrap_or(DEFAULT_PH_DEADLINE_HOURS);
    let rate = input.ph.rate().abs();

    CorrelationResult {
        pattern: Some(PatternKind::PredictivePhWarning),
        root_cause: Some("pH declining - catch it early!".to_string()),
        system_state: SystemState::PreventiveActionNeeded,
        cascading_effects: Vec::new(),
        intervention_priority: vec![
            Intervention::new(
                1,
                format!("Raise pH within next {hours:.0} hours"),
                "Prevent cascade before it starts",
                "Add buffer now while you have time",
            ),
            Intervention::new(
                2,
                "Identify why pH is falling",
                "Prevent recurrence",
                "Check: overfeeding? low alkalinity? high CO2?",
            ),
        ],
        time_to_critical: Some(hours),
        explanation: format!(
            "PREDICTIVE ALERT: pH crash approaching. pH is falling at {rate:.3} per hour and will reach \
             its next threshold in {hours:.1} hours. Caught early: there is time to fix this before the \
             biofilter is affected."
        ),
        predicted_outcome: format!(
            "Without intervention the biofilter cascade can start in about {hours:.0} hours. \
             Buffering now keeps the system in its healthy band."
        ),
    }
}

// ===== PATTERN 4: OPTIMAL AND STABLE =====

fn optimal_stable_matches(input: &CorrelationInput<'_>) -> bool {
    input.ph.within(PH_BIOFILTER_MIN, PH_HEALTHY_MAX)
        && input.temperature.within(TEMP_HEALTHY_MIN_C, TEMP_HEALTHY_MAX_C)
        && input.dissolved_oxygen.value.map_or(false, |v| v >= DO_SAFE_MIN)
        && input.ph.stable()
        && input.temperature.stable()
        && input.dissolved_oxygen.stable()
}

fn optimal_stable(_input: &CorrelationInput<'_>) -> CorrelationResult {
    CorrelationResult {
        pattern: Some(PatternKind::OptimalStable),
        root_cause: None,
        system_state: SystemState::OptimalStable,
        cascading_effects: Vec::new(),
        intervention_priority: Vec::new(),
        time_to_critical: None,
        explanation: "SYSTEM OPERATING OPTIMALLY. All parameters in range and stable over time. \
                      No concerning trends detected. Continue current practices."
            .to_string(),
        predicted_outcome: "System remains healthy under current management.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prediction::ConcernLevel;
    use crate::trend::{TrendDirection, Volatility};

    fn trend(parameter: &str, direction: TrendDirection, rate: f64, concern: ConcernLevel, ttt: Option<f64>) -> TrendResult {
        TrendResult {
            parameter: parameter.to_string(),
            current_value: None,
            direction,
            rate_of_change: rate,
            volatility: Volatility::Stable,
            prediction: None,
            concern_level: concern,
            time_to_threshold: ttt,
            recommendation: String::new(),
            recent: Vec::new(),
        }
    }

    fn stable(parameter: &str) -> TrendResult {
        trend(parameter, TrendDirection::Stable, 0.0, ConcernLevel::None, None)
    }

    #[test]
    fn biofilter_cascade_takes_earliest_deadline() {
        let ph = trend("ph", TrendDirection::Falling, -0.05, ConcernLevel::Critical, Some(8.0));
        let dissolved = trend("do", TrendDirection::Falling, -0.15, ConcernLevel::Warning, Some(10.0));
        let input = CorrelationInput {
            ph: ParameterState::new(Some(6.2), Some(&ph)),
            temperature: ParameterState::new(Some(22.0), None),
            dissolved_oxygen: ParameterState::new(Some(5.5), Some(&dissolved)),
        };

        let result = CorrelationEngine::new().analyze(&input);
        assert_eq!(result.pattern, Some(PatternKind::BiofilterCollapse));
        assert_eq!(result.system_state, SystemState::CriticalCascade);
        assert_eq!(result.time_to_critical, Some(8.0));
        let order: Vec<u32> = result.intervention_priority.iter().map(|i| i.order).collect();
        assert_eq!(order, [1, 2, 3, 4]);
        assert!(result.intervention_priority[0].action.contains("Raise pH"));
        assert!(result.explanation.contains("~8.0 hours"));
    }

    #[test]
    fn biofilter_beats_temperature_cascade() {
        let ph = trend("ph", TrendDirection::Falling, -0.1, ConcernLevel::Critical, Some(2.0));
        let temp = trend("temperature", TrendDirection::Rising, 0.3, ConcernLevel::Warning, Some(5.0));
        let dissolved = trend("do", TrendDirection::Falling, -0.2, ConcernLevel::Warning, None);
        let input = CorrelationInput {
            ph: ParameterState::new(Some(6.2), Some(&ph)),
            temperature: ParameterState::new(Some(27.0), Some(&temp)),
            dissolved_oxygen: ParameterState::new(Some(6.0), Some(&dissolved)),
        };

        let result = CorrelationEngine::new().analyze(&input);
        assert_eq!(result.pattern, Some(PatternKind::BiofilterCollapse));
        assert_eq!(result.time_to_critical, Some(2.0));
    }

    #[test]
    fn temperature_oxygen_cascade_when_ph_healthy() {
        let ph = stable("ph");
        let temp = trend("temperature", TrendDirection::Rising, 0.3, ConcernLevel::Critical, Some(3.3));
        let dissolved = trend("do", TrendDirection::Falling, -0.2, ConcernLevel::Warning, Some(9.0));
        let input = CorrelationInput {
            ph: ParameterState::new(Some(7.0), Some(&ph)),
            temperature: ParameterState::new(Some(27.0), Some(&temp)),
            dissolved_oxygen: ParameterState::new(Some(6.0), Some(&dissolved)),
        };

        let result = CorrelationEngine::new().analyze(&input);
        assert_eq!(result.pattern, Some(PatternKind::TemperatureOxygenCascade));
        assert_eq!(result.intervention_priority.len(), 3);
        assert_eq!(result.time_to_critical, Some(3.3));
        assert!(result.cascading_effects[2].contains("~7.6 mg/L"));
    }

    #[test]
    fn ph_above_cascade_limit_falls_to_predictive() {
        let ph = trend("ph", TrendDirection::Falling, -0.1, ConcernLevel::Critical, Some(6.0));
        let dissolved = trend("do", TrendDirection::Falling, -0.1, ConcernLevel::Warning, Some(5.0));
        let input = CorrelationInput {
            ph: ParameterState::new(Some(6.6), Some(&ph)),
            temperature: ParameterState::new(Some(22.0), None),
            dissolved_oxygen: ParameterState::new(Some(6.5), Some(&dissolved)),
        };

        let result = CorrelationEngine::new().analyze(&input);
        assert_eq!(result.pattern, Some(PatternKind::PredictivePhWarning));
        assert_eq!(result.system_state, SystemState::PreventiveActionNeeded);
        assert_eq!(result.intervention_priority.len(), 2);
        assert_eq!(result.intervention_priority[0].action, "Raise pH within next 6 hours");
    }

    #[test]
    fn predictive_needs_urgent_concern() {
        let ph = trend("ph", TrendDirection::Falling, -0.06, ConcernLevel::Watch, None);
        let input = CorrelationInput {
            ph: ParameterState::new(Some(7.4), Some(&ph)),
            ..CorrelationInput::default()
        };
        assert!(CorrelationEngine::new().matching_pattern(&input).is_none());
    }

    #[test]
    fn optimal_and_stable() {
        let (ph, temp, dissolved) = (stable("ph"), stable("temperature"), stable("do"));
        let input = CorrelationInput {
            ph: ParameterState::new(Some(7.0), Some(&ph)),
            temperature: ParameterState::new(Some(21.0), Some(&temp)),
            dissolved_oxygen: ParameterState::new(Some(7.5), Some(&dissolved)),
        };

        let result = CorrelationEngine::new().analyze(&input);
        assert_eq!(result.system_state, SystemState::OptimalStable);
        assert!(result.intervention_priority.is_empty());
        assert!(result.root_cause.is_none());
    }

    #[test]
    fn missing_inputs_match_nothing() {
        let result = CorrelationEngine::new().analyze(&CorrelationInput::default());
        assert_eq!(result, CorrelationResult::unmatched());
    }

    #[test]
    fn deadline_min_ignores_missing_side() {
        assert_eq!(min_present(Some(3.0), None), Some(3.0));
        assert_eq!(min_present(None, Some(4.0)), Some(4.0));
        assert_eq!(min_present(None, None), None);
        assert_eq!(min_present(Some(8.0), Some(10.0)), Some(8.0));
    }
}
