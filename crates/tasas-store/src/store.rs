use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Local, TimeZone};
use tasas_models::history::{HistoryEntry, PersistedState, Stats};

use crate::error::StoreError;

/// Durable store for the last primary rate and its trailing history.
///
/// The state lives in memory behind a mutex and is flushed to a pretty-printed
/// JSON file after every mutation. One instance owns the file per process;
/// share it through an `Arc`.
pub struct RateStore {
    path: PathBuf,
    state: Mutex<PersistedState>,
}

impl RateStore {
    /// Open the store at `path`, loading existing state if possible.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let state = load(&path);
        Self {
            path,
            state: Mutex::new(state),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The last saved primary rate, or `0.0` when none exists.
    pub fn previous_rate(&self) -> f64 {
        self.lock().previous_primary_rate
    }

    /// Save `rate` stamped with the current local time. Returns the rate it replaced.
    pub fn save(&self, rate: f64) -> f64 {
        self.save_at(rate, Local::now())
    }

    /// Save `rate` stamped with `at` and return the previous primary rate.
    ///
    /// Reading the previous rate and recording the new one happen under the
    /// same lock, so concurrent savers each see a distinct predecessor.
    /// The in-memory state is always updated. A failed flush is logged and
    /// otherwise ignored; the next successful save writes everything.
    pub fn save_at<Tz>(&self, rate: f64, at: DateTime<Tz>) -> f64
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let entry = HistoryEntry {
            rate,
            date: at.format("%Y-%m-%d").to_string(),
            timestamp: at.to_rfc3339(),
        };

        let mut state = self.lock();
        let previous = state.previous_primary_rate;
        state.record(entry);

        match write_state(&self.path, &state) {
            Ok(()) => tracing::debug!(rate, path = %self.path.display(), "Rate saved"),
            Err(e) => {
                tracing::error!(rate, path = %self.path.display(), error = %e, "Failed to flush rate state")
            }
        }
        previous
    }

    /// Up to the last `n` history entries, oldest first.
    pub fn history(&self, n: usize) -> Vec<HistoryEntry> {
        self.lock().recent(n).to_vec()
    }

    pub fn stats(&self) -> Option<Stats> {
        self.lock().stats()
    }

    /// A copy of the full in-memory state.
    pub fn snapshot(&self) -> PersistedState {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, PersistedState> {
        // The state is plain data; a panic mid-update cannot leave it half-written.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Read the state file at `path`.
///
/// Missing or unreadable files yield the default state.
pub fn load(path: &Path) -> PersistedState {
    if !path.exists() {
        tracing::info!(path = %path.display(), "No state file, starting fresh");
        return PersistedState::default();
    }

    match read_state(path) {
        Ok(state) => {
            tracing::info!(
                path = %path.display(),
                previous = state.previous_primary_rate,
                entries = state.history.len(),
                "Rate state loaded"
            );
            state
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Failed to load rate state, starting fresh");
            PersistedState::default()
        }
    }
}

fn read_state(path: &Path) -> Result<PersistedState, StoreError> {
    let content = fs::read_to_string(path)?;
    let mut state: PersistedState = serde_json::from_str(&content)?;
    // Hand-edited files may exceed the cap; normalise on load.
    if state.history.len() > tasas_models::MAX_HISTORY {
        let excess = state.history.len() - tasas_models::MAX_HISTORY;
        state.history.drain(..excess);
    }
    Ok(state)
}

fn write_state(path: &Path, state: &PersistedState) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let content = serde_json::to_string_pretty(state)?;
    fs::write(path, content)?;
    Ok(())
}
