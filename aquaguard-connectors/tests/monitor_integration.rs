//! Integration tests for full analysis cycles

mod common;

use std::sync::Arc;
use std::time::Duration;

use aquaguard_connectors::{monitor::DEFAULT_CYCLE_INTERVAL, DeliveryStatus, Monitor, NotificationDispatcher};
use aquaguard_core::{
    constants::MS_PER_MINUTE, diagnosis::OverallStatus, AlertLevel, ConcernLevel, ConfigError, EngineConfig,
    MemorySource, MockTimeSource, PatternKind, TrendDirection,
};
use tokio::sync::watch;

use common::{linear, record_hourly, FailingChannel, RecordingChannel, T0};

fn monitor_with(source: Arc<MemorySource>, dispatcher: NotificationDispatcher) -> (Monitor, MockTimeSource) {
    let clock = MockTimeSource::new(T0);
    let monitor = Monitor::new(EngineConfig::default(), source, dispatcher)
        .unwrap()
        .with_clock(Arc::new(clock.clone()));
    (monitor, clock)
}

#[test]
fn invalid_settings_rejected_at_startup() {
    let source = Arc::new(MemorySource::new());

    let few_samples = EngineConfig::default().min_trend_samples(0);
    assert!(matches!(
        Monitor::new(few_samples, source.clone(), NotificationDispatcher::default()),
        Err(ConfigError::InvalidSetting { name: "min_trend_samples", .. })
    ));

    let past_horizon = EngineConfig::default().prediction_horizon_hours(-1.0);
    assert!(matches!(
        Monitor::new(past_horizon, source, NotificationDispatcher::default()),
        Err(ConfigError::InvalidSetting { name: "prediction_horizon_hours", .. })
    ));
}

#[tokio::test]
async fn biofilter_collapse_cycle() {
    let source = Arc::new(MemorySource::new());
    record_hourly(&source, "ph", T0, &linear(6.6, -0.1, 5));
    record_hourly(&source, "do", T0, &linear(6.3, -0.2, 5));
    record_hourly(&source, "temperature", T0, &[22.0; 5]);

    let (monitor, _clock) = monitor_with(source, NotificationDispatcher::default());
    let report = monitor.run_cycle().await;

    assert_eq!(report.timestamp, T0);
    assert_eq!(report.readings.len(), 3);
    assert_eq!(report.trends["ph"].direction, TrendDirection::Falling);
    assert_eq!(report.summary.overall_concern, ConcernLevel::Critical);
    assert_eq!(report.summary.urgent_actions[0].parameter, "ph");

    assert_eq!(report.correlation.pattern, Some(PatternKind::BiofilterCollapse));
    assert_eq!(report.correlation.time_to_critical, Some(2.0));
    assert_eq!(report.holistic.overall_status, OverallStatus::Critical);

    // 6.2 and 5.5 are inside the alert warning bands
    assert!(report.alerts.is_empty());
}

#[tokio::test]
async fn critical_alerts_notify_once_per_cooldown() {
    let source = Arc::new(MemorySource::new());
    source.set_current("do", 3.5);
    source.set_current("ph", 5.3);

    let recorder = RecordingChannel::new();
    let (monitor, clock) = monitor_with(Arc::clone(&source), NotificationDispatcher::default().with_channel(recorder.clone()));

    let first = monitor.run_cycle().await;
    let levels: Vec<(&str, AlertLevel)> = first.alerts.iter().map(|a| (a.sensor.as_str(), a.level)).collect();
    assert_eq!(levels, [("do", AlertLevel::Critical), ("ph", AlertLevel::Warning)]);
    // Warnings are recorded, not pushed
    assert_eq!(first.deliveries.len(), 1);
    assert_eq!(recorder.count(), 1);
    assert!(recorder.last().unwrap().recommendations[0].starts_with("IMMEDIATE"));

    clock.advance(10 * MS_PER_MINUTE);
    let second = monitor.run_cycle().await;
    assert!(second.alerts.is_empty());
    assert_eq!(second.suppressed, 2);
    assert_eq!(recorder.count(), 1);

    clock.advance(20 * MS_PER_MINUTE);
    let third = monitor.run_cycle().await;
    assert_eq!(third.alerts.len(), 2);
    assert_eq!(recorder.count(), 2);
}

#[tokio::test]
async fn channel_failure_keeps_alert_accepted() {
    let source = Arc::new(MemorySource::new());
    source.set_current("temperature", 29.0);

    let recorder = RecordingChannel::new();
    let dispatcher = NotificationDispatcher::new(Duration::from_secs(2))
        .with_channel(FailingChannel)
        .with_channel(recorder.clone());
    let (monitor, _clock) = monitor_with(source, dispatcher);

    let report = monitor.run_cycle().await;

    assert_eq!(report.alerts.len(), 1);
    assert!(matches!(report.deliveries[0].status, DeliveryStatus::Failed(_)));
    assert_eq!(report.deliveries[1].status, DeliveryStatus::Sent);
    assert_eq!(monitor.history().last_sent("temperature", AlertLevel::Critical), Some(T0));
    assert_eq!(monitor.dispatcher().stats().failed, 1);
}

#[tokio::test]
async fn offline_sensor_is_skipped() {
    let source = Arc::new(MemorySource::new());
    record_hourly(&source, "ph", T0, &[7.0; 6]);
    record_hourly(&source, "do", T0, &[7.5; 6]);
    source.set_offline("ph");

    let (monitor, _clock) = monitor_with(source, NotificationDispatcher::default());
    let report = monitor.run_cycle().await;

    assert!(!report.readings.contains_key("ph"));
    assert!(!report.trends.contains_key("ph"));
    assert!(report.trends.contains_key("do"));
    // Optimal-and-stable needs all three parameters
    assert_eq!(report.correlation.pattern, None);
}

#[tokio::test]
async fn report_serializes_for_dashboards() {
    let source = Arc::new(MemorySource::new());
    record_hourly(&source, "ph", T0, &[7.0; 6]);
    record_hourly(&source, "temperature", T0, &[21.0; 6]);
    record_hourly(&source, "do", T0, &[7.5; 6]);

    let (monitor, _clock) = monitor_with(source, NotificationDispatcher::default());
    let report = monitor.run_cycle().await;
    assert_eq!(report.correlation.pattern, Some(PatternKind::OptimalStable));
    assert_eq!(report.holistic.overall_status, OverallStatus::Excellent);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["correlation"]["system_state"], "optimal_stable");
    assert_eq!(json["trends"]["ph"]["direction"], "stable");
    assert_eq!(json["summary"]["overall_concern"], "none");
}

#[tokio::test(start_paused = true)]
async fn run_loop_stops_on_shutdown() {
    let source = Arc::new(MemorySource::new());
    source.set_current("ph", 7.0);
    let (monitor, _clock) = monitor_with(source, NotificationDispatcher::default());
    let (stop, shutdown) = watch::channel(false);

    let stopper = async move {
        // Ticks at 0, 5 and 10 minutes
        tokio::time::sleep(Duration::from_secs(12 * 60)).await;
        stop.send(true).unwrap();
    };
    let (cycles, ()) = tokio::join!(monitor.run(DEFAULT_CYCLE_INTERVAL, shutdown), stopper);

    assert_eq!(cycles, 3);
}
