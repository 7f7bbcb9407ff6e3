//! Integration tests for notification fan-out

mod common;

use std::time::Duration;

use aquaguard_connectors::{DeliveryStatus, NotificationDispatcher, Severity};
use aquaguard_core::{AlertEvaluator, ThresholdTable};

use common::{FailingChannel, HangingChannel, RecordingChannel, T0};

fn critical_do_alert() -> aquaguard_core::Alert {
    let table = ThresholdTable::alert_defaults();
    AlertEvaluator::new()
        .evaluate("do", 3.5, table.get("do").unwrap(), T0)
        .unwrap()
}

#[tokio::test(start_paused = true)]
async fn slow_and_failing_channels_do_not_block_others() {
    let recorder = RecordingChannel::new();
    let dispatcher = NotificationDispatcher::new(Duration::from_secs(5))
        .with_channel(HangingChannel)
        .with_channel(FailingChannel)
        .with_channel(recorder.clone());

    let started = tokio::time::Instant::now();
    let outcomes = dispatcher.dispatch(&critical_do_alert(), &["Increase aeration"]).await;

    // Bounded by the per-channel budget, not the hung channel
    assert!(started.elapsed() <= Duration::from_secs(6));

    let statuses: Vec<&DeliveryStatus> = outcomes.iter().map(|o| &o.status).collect();
    assert_eq!(statuses[0], &DeliveryStatus::TimedOut);
    assert!(matches!(statuses[1], DeliveryStatus::Failed(reason) if reason.contains("503")));
    assert_eq!(statuses[2], &DeliveryStatus::Sent);

    let channels: Vec<&str> = outcomes.iter().map(|o| o.channel.as_str()).collect();
    assert_eq!(channels, ["hanging", "failing", "recording"]);

    let delivered = recorder.last().unwrap();
    assert_eq!(delivered.severity, Severity::Critical);
    assert_eq!(delivered.recommendations, ["Increase aeration"]);

    let stats = dispatcher.stats();
    assert_eq!((stats.sent, stats.failed, stats.timed_out), (1, 1, 1));
    assert!(stats.last_error.is_some());
}

#[tokio::test]
async fn no_retry_after_failure() {
    let dispatcher = NotificationDispatcher::new(Duration::from_secs(1)).with_channel(FailingChannel);
    let outcomes = dispatcher.dispatch(&critical_do_alert(), &[]).await;

    assert_eq!(outcomes.len(), 1);
    assert_eq!(dispatcher.stats().failed, 1);
}

#[tokio::test]
async fn test_message_reaches_every_channel() {
    let first = RecordingChannel::new();
    let second = RecordingChannel::new();
    let dispatcher = NotificationDispatcher::default()
        .with_channel(first.clone())
        .with_channel(second.clone());

    let outcomes = dispatcher.send_test(T0).await;

    assert!(outcomes.iter().all(|o| o.is_sent()));
    assert_eq!((first.count(), second.count()), (1, 1));
    let notification = first.last().unwrap();
    assert_eq!(notification.severity, Severity::Info);
    assert!(notification.headline().starts_with("AQUAPONICS ALERT: "));
}
