//! Dashboard routes exercised in-process through `tower::ServiceExt::oneshot`.

use std::path::Path;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tasas_bot::dashboard::create_router;
use tasas_bot::test_support::{mock_app, RecordingSink};
use tasas_rates::test_support::test_instant;
use tower::ServiceExt;

async fn get(router: axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn app_in(dir: &Path, log_file: Option<&Path>) -> std::sync::Arc<tasas_bot::App> {
    mock_app(
        100.0,
        &dir.join("state.json"),
        log_file,
        test_instant(),
        RecordingSink::new(),
    )
}

#[tokio::test]
async fn health_reports_version() {
    let dir = tempfile::tempdir().unwrap();
    let (status, body) = get(create_router(app_in(dir.path(), None)), "/api/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn status_before_and_after_a_report() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_in(dir.path(), None);

    let (status, body) = get(create_router(app.clone()), "/api/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["data"]["last_update"].is_null());
    assert_eq!(body["data"]["scheduler_running"], false);
    assert_eq!(body["data"]["chat_id"], 4242);
    assert!(body["data"].get("stats").is_none());

    app.service.report().await.unwrap();

    let (_, body) = get(create_router(app), "/api/status").await;
    assert_eq!(body["data"]["last_rates"]["bcv"], 100.0);
    assert_eq!(body["data"]["stats"]["count"], 1);
    assert!(body["data"]["last_update"].is_string());
}

#[tokio::test]
async fn history_defaults_to_seven_days() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_in(dir.path(), None);
    for rate in 1..=10 {
        app.service.store().save(rate as f64);
    }

    let (_, body) = get(create_router(app.clone()), "/api/history").await;
    let entries = body["data"].as_array().unwrap();
    assert_eq!(entries.len(), 7);
    assert_eq!(entries[0]["rate"], 4.0);
    assert_eq!(entries[6]["rate"], 10.0);

    let (_, body) = get(create_router(app), "/api/history?days=3").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn logs_serve_trailing_lines() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("bot.log");
    let body: String = (1..=80).map(|i| format!("entry {i}\n")).collect();
    std::fs::write(&log, body).unwrap();

    let (status, body) = get(create_router(app_in(dir.path(), Some(&log))), "/api/logs").await;
    assert_eq!(status, StatusCode::OK);
    let lines = body["data"].as_array().unwrap();
    assert_eq!(lines.len(), 50);
    assert_eq!(lines[49], "entry 80");
}

#[tokio::test]
async fn unreadable_log_is_a_500_envelope() {
    let dir = tempfile::tempdir().unwrap();
    // A directory where the log file should be.
    let (status, body) =
        get(create_router(app_in(dir.path(), Some(dir.path()))), "/api/logs").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn non_numeric_days_is_a_500_envelope() {
    let dir = tempfile::tempdir().unwrap();
    let (status, body) = get(
        create_router(app_in(dir.path(), None)),
        "/api/history?days=abc",
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("invalid digit"));
    assert!(body["timestamp"].is_string());
}
