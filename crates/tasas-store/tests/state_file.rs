//! Integration tests for the on-disk state file format.

use std::fs;

use tasas_models::PersistedState;
use tasas_store::RateStore;

#[test]
fn reads_legacy_state_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rates_data.json");
    fs::write(
        &path,
        r#"{
  "anterior": 35.71,
  "history": [
    { "rate": 35.71, "timestamp": "2025-01-10T09:00:03.120044", "date": "2025-01-10" }
  ]
}"#,
    )
    .unwrap();

    let store = RateStore::open(&path);
    assert_eq!(store.previous_rate(), 35.71);
    assert_eq!(store.history(7)[0].date, "2025-01-10");
}

#[test]
fn file_with_both_rate_keys_keeps_history() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rates_data.json");
    fs::write(
        &path,
        r#"{
  "anterior": 35.71,
  "previous_primary_rate": 36.10,
  "history": [
    { "rate": 35.71, "date": "2025-01-10", "timestamp": "2025-01-10T09:00:03-04:00" },
    { "rate": 36.10, "date": "2025-01-13", "timestamp": "2025-01-13T09:00:05-04:00" }
  ]
}"#,
    )
    .unwrap();

    let store = RateStore::open(&path);
    assert_eq!(store.previous_rate(), 36.10);
    assert_eq!(store.history(7).len(), 2);
}

#[test]
fn written_file_parses_as_state() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("rates_data.json");

    let store = RateStore::open(&path);
    store.save(36.0);
    store.save(37.5);

    let content = fs::read_to_string(&path).unwrap();
    let state: PersistedState = serde_json::from_str(&content).unwrap();
    assert_eq!(state.previous_primary_rate, 37.5);
    assert_eq!(state.history.len(), 2);
    assert_eq!(state, store.snapshot());
}

#[test]
fn oversized_history_is_trimmed_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rates_data.json");

    let history: Vec<serde_json::Value> = (0..40)
        .map(|i| {
            serde_json::json!({
                "rate": i as f64,
                "date": "2025-01-01",
                "timestamp": "2025-01-01T09:00:00-04:00",
            })
        })
        .collect();
    let doc = serde_json::json!({ "previous_primary_rate": 39.0, "history": history });
    fs::write(&path, serde_json::to_string_pretty(&doc).unwrap()).unwrap();

    let store = RateStore::open(&path);
    let entries = store.history(100);
    assert_eq!(entries.len(), tasas_models::MAX_HISTORY);
    assert_eq!(entries[0].rate, 10.0);
}
