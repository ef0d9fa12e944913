//! Scheduler lifecycle: start/stop transitions, one dispatch per day, and the
//! failure message path, against mock sources and a temp state file.

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use tasas_bot::test_support::{mock_app, mock_service, RecordingSink};
use tasas_bot::{Scheduler, SchedulerState};
use tasas_models::quote::SourceKind;
use tasas_rates::test_support::{test_instant, MockSource};
use tasas_rates::FixedClock;

async fn wait_for_messages(sink: &RecordingSink, count: usize) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while sink.messages().len() < count {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("sink did not receive the expected messages");
}

#[tokio::test]
async fn start_stop_transitions() {
    let dir = tempfile::tempdir().unwrap();
    let sink = RecordingSink::new();
    let app = mock_app(100.0, &dir.path().join("state.json"), None, test_instant(), sink);

    assert_eq!(app.scheduler.state(), SchedulerState::Idle);
    assert!(app.scheduler.start());
    assert!(app.scheduler.is_running());
    assert!(!app.scheduler.start(), "second start is a no-op");

    assert!(app.scheduler.stop());
    assert!(!app.scheduler.is_running());
    assert!(!app.scheduler.stop());

    // Restartable after a stop.
    assert!(app.scheduler.start());
    app.scheduler.shutdown().await;
    assert_eq!(app.scheduler.state(), SchedulerState::Idle);
}

#[tokio::test]
async fn running_scheduler_dispatches_once_per_day() {
    let dir = tempfile::tempdir().unwrap();
    let sink = RecordingSink::new();
    // Monday 09:00 in Caracas; ticks every 10ms.
    let app = mock_app(
        100.0,
        &dir.path().join("state.json"),
        None,
        test_instant(),
        sink.clone(),
    );

    app.scheduler.start();
    wait_for_messages(&sink, 1).await;
    // Let many more ticks happen inside the same window.
    tokio::time::sleep(Duration::from_millis(100)).await;
    app.scheduler.shutdown().await;

    let messages = sink.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("BCV: 100.00 Bs"));
    assert_eq!(app.service.store().history(30).len(), 1);
    assert!(app.status().last_update.is_some());
}

#[tokio::test]
async fn no_dispatch_outside_the_window() {
    let dir = tempfile::tempdir().unwrap();
    let sink = RecordingSink::new();
    // Saturday 2025-01-11 09:30 in Caracas
    let saturday = Utc.with_ymd_and_hms(2025, 1, 11, 13, 30, 0).unwrap();
    let app = mock_app(100.0, &dir.path().join("state.json"), None, saturday, sink.clone());

    assert!(!app.scheduler.tick().await);
    assert!(sink.messages().is_empty());
    assert!(app.scheduler.last_dispatched().is_none());
}

#[tokio::test]
async fn official_failure_sends_failure_message_and_closes_the_day() {
    let dir = tempfile::tempdir().unwrap();
    let sink = RecordingSink::new();
    let service = mock_service(
        MockSource::failing("official_usd", SourceKind::Official),
        &dir.path().join("state.json"),
        test_instant(),
    );
    let scheduler = Scheduler::new(
        service.clone(),
        sink.clone(),
        Arc::new(FixedClock(test_instant())),
        9,
        Duration::from_secs(60),
    );

    assert!(scheduler.tick().await);
    assert!(!scheduler.tick().await);

    let messages = sink.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].starts_with("❌"));
    assert_eq!(service.store().previous_rate(), 0.0);
    assert!(service.last_update().is_none());
}

#[tokio::test]
async fn delivery_failure_still_closes_the_day() {
    let dir = tempfile::tempdir().unwrap();
    let sink = RecordingSink::failing();
    let app = mock_app(
        100.0,
        &dir.path().join("state.json"),
        None,
        test_instant(),
        sink.clone(),
    );

    assert!(app.scheduler.tick().await);
    assert!(!app.scheduler.tick().await);
    assert_eq!(sink.messages().len(), 1);
}
