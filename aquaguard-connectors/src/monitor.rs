//! One Analysis Cycle
//!
//! ## Overview
//!
//! [`Monitor::run_cycle`] is what a scheduler calls every few minutes:
//!
//! 1. Read the current value of every parameter with alert or predictive
//!    thresholds (plus the configured trend parameters).
//! 2. Estimate trends for the trend parameters that have a current value.
//! 3. Evaluate alerts and pass them through the cooldown gate.
//! 4. Push accepted critical alerts to the notification channels.
//! 5. Summarise trends, run correlation and the holistic diagnosis.
//!
//! ## Failure Handling
//!
//! A reading source error for one parameter drops that parameter from the
//! cycle and is logged at `warn`. A missing value is skipped silently.
//! Channel failures end up in the report's delivery outcomes. The cycle
//! itself cannot fail.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;

use aquaguard_core::{
    alerts::recommendations_for,
    assess_holistic,
    constants::time::{DEFAULT_CYCLE_INTERVAL_MINUTES, MS_PER_MINUTE},
    readings::parameters,
    Alert, AlertEvaluator, AlertHistory, ConfigResult, CorrelationEngine, CorrelationInput, CorrelationResult, EngineConfig,
    HolisticAssessment, ReadingSource, SystemTime, TimeSource, Timestamp, TrendEstimator, TrendResult, TrendSummary,
};
use serde::Serialize;
use tokio::sync::watch;

use crate::dispatcher::{DeliveryOutcome, NotificationDispatcher};

/// Cycle period used when the caller has no preference
pub const DEFAULT_CYCLE_INTERVAL: Duration = Duration::from_millis(DEFAULT_CYCLE_INTERVAL_MINUTES * MS_PER_MINUTE);

/// Everything one cycle found, for a dashboard or API layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub timestamp: Timestamp,
    pub readings: BTreeMap<String, f64>,
    pub trends: BTreeMap<String, TrendResult>,
    pub summary: TrendSummary,
    /// Alerts accepted by the cooldown gate
    pub alerts: Vec<Alert>,
    /// Alerts dropped by the cooldown gate
    pub suppressed: usize,
    pub deliveries: Vec<DeliveryOutcome>,
    pub correlation: CorrelationResult,
    pub holistic: HolisticAssessment,
}

/// Owns the engine state and runs analysis cycles
pub struct Monitor {
    config: EngineConfig,
    source: Arc<dyn ReadingSource>,
    clock: Arc<dyn TimeSource>,
    estimator: TrendEstimator,
    evaluator: AlertEvaluator,
    history: AlertHistory,
    correlation: CorrelationEngine,
    dispatcher: NotificationDispatcher,
}

impl Monitor {
    /// Monitor on the wall clock
    ///
    /// Fails if `config` has an invalid scalar setting.
    pub fn new(
        config: EngineConfig,
        source: Arc<dyn ReadingSource>,
        dispatcher: NotificationDispatcher,
    ) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self {
            estimator: config.trend_estimator(),
            history: AlertHistory::new(config.cooldown()),
            config,
            source,
            clock: Arc::new(SystemTime),
            evaluator: AlertEvaluator::new(),
            correlation: CorrelationEngine::new(),
            dispatcher,
        })
    }

    /// Replace the clock, e.g. with a `MockTimeSource` in tests
    pub fn with_clock(mut self, clock: Arc<dyn TimeSource>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn history(&self) -> &AlertHistory {
        &self.history
    }

    pub fn dispatcher(&self) -> &NotificationDispatcher {
        &self.dispatcher
    }

    /// Parameters read each cycle
    pub fn parameters(&self) -> BTreeSet<&str> {
        self.config
            .alert_thresholds
            .parameters()
            .chain(self.config.predictive_thresholds.parameters())
            .chain(self.config.trend_parameters.iter().map(String::as_str))
            .collect()
    }

    pub async fn run_cycle(&self) -> AnalysisReport {
        let now = self.clock.now();
        let readings = self.read_current();
        let trends = self.estimate_trends(&readings, now);

        let evaluated = self.evaluate_alerts(&readings, now);
        let evaluated_count = evaluated.len();
        let alerts = self.history.filter(evaluated, now);
        for alert in &alerts {
            log::info!("Alert accepted: {}", alert.message);
        }

        let mut deliveries = Vec::new();
        for alert in alerts.iter().filter(|a| a.is_critical()) {
            let steps = recommendations_for(alert, self.config.alert_thresholds.get(&alert.sensor));
            deliveries.extend(self.dispatcher.dispatch(alert, &steps).await);
        }

        let correlation = self.correlation.analyze(&CorrelationInput::from_cycle(&readings, &trends));
        let holistic = assess_holistic(
            readings.get(parameters::PH).copied(),
            readings.get(parameters::TEMPERATURE).copied(),
            readings.get(parameters::DISSOLVED_OXYGEN).copied(),
        );

        AnalysisReport {
            timestamp: now,
            summary: TrendSummary::from_trends(trends.values()),
            suppressed: evaluated_count - alerts.len(),
            readings,
            trends,
            alerts,
            deliveries,
            correlation,
            holistic,
        }
    }

    /// Run a cycle every `interval` until `shutdown` turns true
    ///
    /// The first cycle runs immediately. Returns the number of cycles run.
    pub async fn run(&self, interval: Duration, mut shutdown: watch::Receiver<bool>) -> usize {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        let mut cycles = 0;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let report = self.run_cycle().await;
                    cycles += 1;
                    log::debug!(
                        "Cycle {cycles}: {} readings, {} alerts, overall concern {}",
                        report.readings.len(),
                        report.alerts.len(),
                        report.summary.overall_concern.name()
                    );
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        log::info!("Monitor stopped after {cycles} cycle(s)");
        cycles
    }

    fn read_current(&self) -> BTreeMap<String, f64> {
        let mut readings = BTreeMap::new();
        for parameter in self.parameters() {
            match self.source.current(parameter) {
                Ok(Some(value)) => {
                    readings.insert(parameter.to_string(), value);
                }
                Ok(None) => log::debug!("No current reading for {parameter}"),
                Err(e) => log::warn!("Skipping {parameter} this cycle: {e}"),
            }
        }
        readings
    }

    fn estimate_trends(&self, readings: &BTreeMap<String, f64>, now: Timestamp) -> BTreeMap<String, TrendResult> {
        let mut trends = BTreeMap::new();
        let lookback = self.config.lookback();

        for parameter in self.config.trend_parameters.iter().filter(|p| readings.contains_key(p.as_str())) {
            match self.source.history(parameter, now, lookback) {
                Ok(samples) => {
                    let thresholds = self.config.predictive_thresholds.get(parameter);
                    trends.insert(parameter.clone(), self.estimator.analyze(parameter, &samples, thresholds));
                }
                Err(e) => log::warn!("No trend for {parameter} this cycle: {e}"),
            }
        }
        trends
    }

    fn evaluate_alerts(&self, readings: &BTreeMap<String, f64>, now: Timestamp) -> Vec<Alert> {
        readings
            .iter()
            .filter_map(|(sensor, value)| {
                let thresholds = self.config.alert_thresholds.get(sensor)?;
                self.evaluator.evaluate(sensor, *value, thresholds, now)
            })
            .collect()
    }
}
