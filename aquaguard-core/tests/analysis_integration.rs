//! Integration tests for the analysis engine
//!
//! Drives histories through trend estimation, crossing prediction and
//! correlation the way one monitoring cycle does.

mod common;

use std::time::Duration;

use aquaguard_core::{
    constants::MS_PER_MINUTE,
    prediction::ConcernLevel,
    trend::{slope, Confidence},
    AlertEvaluator, AlertHistory, AlertLevel, CorrelationEngine, CorrelationInput, MemorySource,
    MockTimeSource, PatternKind, ReadingSource, SystemState, ThresholdTable, TimeSource, TrendDirection,
    TrendEstimator, TrendSummary,
};
use proptest::prelude::*;

use common::{hourly, jittered, linear, Cycle, T0};

#[test]
fn falling_ph_projects_critical_in_six_hours() {
    let table = ThresholdTable::predictive_defaults();
    let trend = TrendEstimator::new().analyze("ph", &hourly(&[7.0, 6.9, 6.8, 6.7, 6.6]), table.get("ph"));

    assert_eq!(trend.direction, TrendDirection::Falling);
    assert!((trend.rate_of_change + 0.1).abs() < 1e-9);
    assert_eq!(trend.concern_level, ConcernLevel::Critical);
    assert_eq!(trend.time_to_threshold, Some(6.0));

    let prediction = trend.prediction.unwrap();
    assert_eq!(prediction.predicted_value, 4.2);
    assert_eq!(prediction.confidence, Confidence::High);
}

#[test]
fn ph_above_cascade_limit_gets_predictive_warning() {
    let cycle = Cycle::from_series(&[
        ("ph", vec![7.0, 6.9, 6.8, 6.7, 6.6]),
        ("temperature", vec![22.0; 5]),
        ("do", linear(7.3, -0.2, 5)),
    ]);

    let result = CorrelationEngine::new().analyze(&CorrelationInput::from_cycle(&cycle.readings, &cycle.trends));
    assert_eq!(result.pattern, Some(PatternKind::PredictivePhWarning));
    assert_eq!(result.time_to_critical, Some(6.0));
}

#[test]
fn biofilter_cascade_from_histories() {
    let cycle = Cycle::from_series(&[
        ("ph", linear(6.6, -0.1, 5)),
        ("temperature", vec![22.0; 5]),
        ("do", linear(6.3, -0.2, 5)),
    ]);
    // ph 6.2 → 6.0 in 2h, do 5.5 → 4.0 in 7.5h
    assert_eq!(cycle.trends["ph"].time_to_threshold, Some(2.0));
    assert_eq!(cycle.trends["do"].time_to_threshold, Some(7.5));

    let result = CorrelationEngine::new().analyze(&CorrelationInput::from_cycle(&cycle.readings, &cycle.trends));
    assert_eq!(result.pattern, Some(PatternKind::BiofilterCollapse));
    assert_eq!(result.system_state, SystemState::CriticalCascade);
    assert_eq!(result.time_to_critical, Some(2.0));
    assert_eq!(result.intervention_priority.len(), 4);
}

#[test]
fn warming_water_triggers_temperature_cascade() {
    let cycle = Cycle::from_series(&[
        ("ph", vec![7.0; 5]),
        ("temperature", linear(25.0, 0.5, 5)),
        ("do", linear(6.8, -0.2, 5)),
    ]);

    let result = CorrelationEngine::new().analyze(&CorrelationInput::from_cycle(&cycle.readings, &cycle.trends));
    assert_eq!(result.pattern, Some(PatternKind::TemperatureOxygenCascade));
    // temperature 27 → 28 in 2h beats do 6.0 → 4.0 in 10h
    assert_eq!(result.time_to_critical, Some(2.0));
}

#[test]
fn steady_healthy_system_is_optimal() {
    let cycle = Cycle::from_series(&[
        ("ph", vec![7.0; 6]),
        ("temperature", vec![21.0; 6]),
        ("do", vec![7.5; 6]),
    ]);

    let result = CorrelationEngine::new().analyze(&CorrelationInput::from_cycle(&cycle.readings, &cycle.trends));
    assert_eq!(result.pattern, Some(PatternKind::OptimalStable));
    assert!(result.intervention_priority.is_empty());

    let summary = TrendSummary::from_trends(cycle.trends.values());
    assert_eq!(summary.overall_concern, ConcernLevel::None);
}

#[test]
fn short_history_blocks_every_trend_pattern() {
    let cycle = Cycle::from_series(&[
        ("ph", vec![6.4, 6.3, 6.2]),
        ("temperature", vec![22.0; 3]),
        ("do", vec![5.8, 5.6, 5.5]),
    ]);
    assert_eq!(cycle.trends["ph"].direction, TrendDirection::InsufficientData);

    let result = CorrelationEngine::new().analyze(&CorrelationInput::from_cycle(&cycle.readings, &cycle.trends));
    assert_eq!(result.pattern, None);
    assert_eq!(result.system_state, SystemState::Unknown);
}

#[test]
fn noisy_flat_signal_stays_stable() {
    let table = ThresholdTable::predictive_defaults();
    let trend = TrendEstimator::new().analyze("do", &hourly(&jittered(7.5, 0.4, 12)), table.get("do"));
    assert_eq!(trend.direction, TrendDirection::Stable);
    assert_eq!(trend.concern_level, ConcernLevel::None);
}

#[test]
fn cooldown_with_controlled_clock() {
    let clock = MockTimeSource::new(T0);
    let history = AlertHistory::new(Duration::from_secs(30 * 60));
    let table = ThresholdTable::alert_defaults();
    let evaluator = AlertEvaluator::new();

    let first = evaluator.evaluate("do", 3.5, table.get("do").unwrap(), clock.now()).unwrap();
    assert_eq!(first.level, AlertLevel::Critical);
    assert!(history.admit(&first, clock.now()));

    // Re-evaluating the same reading in the same window changes nothing
    for _ in 0..5 {
        clock.advance(5 * MS_PER_MINUTE);
        let repeat = evaluator.evaluate("do", 3.5, table.get("do").unwrap(), clock.now()).unwrap();
        assert!(!history.admit(&repeat, clock.now()));
    }
    assert_eq!(history.last_sent("do", AlertLevel::Critical), Some(T0));

    clock.advance(5 * MS_PER_MINUTE);
    let later = evaluator.evaluate("do", 3.5, table.get("do").unwrap(), clock.now()).unwrap();
    assert!(history.admit(&later, clock.now()));
}

#[test]
fn memory_source_feeds_estimator() {
    let source = MemorySource::new();
    source.record_series("temperature", T0, 3_600_000, &linear(20.0, 0.2, 8));
    let now = T0 + 7 * 3_600_000;

    let samples = source.history("temperature", now, Duration::from_secs(24 * 3600)).unwrap();
    assert_eq!(samples.len(), 8);

    let trend = TrendEstimator::new().analyze("temperature", &samples, None);
    assert_eq!(trend.direction, TrendDirection::Rising);
    assert_eq!(trend.recommendation, "No thresholds defined");
    assert_eq!(source.current("temperature").unwrap(), Some(trend.current_value.unwrap()));
}

proptest! {
    #[test]
    fn exact_lines_recover_their_slope(
        start in 0.0f64..20.0,
        rate in -2.0f64..2.0,
        count in 5usize..48,
    ) {
        let samples = hourly(&linear(start, rate, count));
        prop_assert!((slope(&samples) - rate).abs() < 1e-6);
    }

    #[test]
    fn direction_matches_slope_band(rate in -1.0f64..1.0) {
        let samples = hourly(&linear(10.0, rate, 10));
        let trend = TrendEstimator::new().analyze("x", &samples, None);
        let expected = if rate > 0.05 + 1e-6 {
            Some(TrendDirection::Rising)
        } else if rate < -0.05 - 1e-6 {
            Some(TrendDirection::Falling)
        } else if rate.abs() < 0.05 - 1e-6 {
            Some(TrendDirection::Stable)
        } else {
            None
        };
        if let Some(direction) = expected {
            prop_assert_eq!(trend.direction, direction);
        }
    }
}
