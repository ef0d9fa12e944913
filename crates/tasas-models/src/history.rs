use serde::{Deserialize, Serialize};

/// Maximum number of history entries kept in the state file.
pub const MAX_HISTORY: usize = 30;

/// One persisted observation of the primary rate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntry {
    pub rate: f64,
    /// Local calendar date, `YYYY-MM-DD`.
    pub date: String,
    /// RFC 3339 timestamp of the save.
    pub timestamp: String,
}

/// The durable state file contents.
///
/// ```json
/// {
///   "previous_primary_rate": 36.5,
///   "history": [
///     { "rate": 36.5, "date": "2025-01-13", "timestamp": "2025-01-13T09:00:12-04:00" }
///   ]
/// }
/// ```
///
/// `previous_primary_rate <= 0` means no prior observation exists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(from = "StoredState")]
pub struct PersistedState {
    pub previous_primary_rate: f64,
    pub history: Vec<HistoryEntry>,
}

/// On-disk shape accepted on load. Older files name the previous rate
/// `anterior`; when both keys are present the current one wins.
#[derive(Deserialize)]
struct StoredState {
    #[serde(default)]
    previous_primary_rate: Option<f64>,
    #[serde(default)]
    anterior: Option<f64>,
    #[serde(default)]
    history: Vec<HistoryEntry>,
}

impl From<StoredState> for PersistedState {
    fn from(stored: StoredState) -> Self {
        Self {
            previous_primary_rate: stored
                .previous_primary_rate
                .or(stored.anterior)
                .unwrap_or_default(),
            history: stored.history,
        }
    }
}

impl PersistedState {
    /// Record a new primary rate, evicting the oldest entries beyond [`MAX_HISTORY`].
    pub fn record(&mut self, entry: HistoryEntry) {
        self.previous_primary_rate = entry.rate;
        self.history.push(entry);
        if self.history.len() > MAX_HISTORY {
            let excess = self.history.len() - MAX_HISTORY;
            self.history.drain(..excess);
        }
    }

    /// The last `n` entries, oldest first.
    pub fn recent(&self, n: usize) -> &[HistoryEntry] {
        let start = self.history.len().saturating_sub(n);
        &self.history[start..]
    }

    pub fn stats(&self) -> Option<Stats> {
        let first = self.history.first()?;
        let last = self.history.last()?;

        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        for entry in &self.history {
            min = min.min(entry.rate);
            max = max.max(entry.rate);
            sum += entry.rate;
        }

        Some(Stats {
            count: self.history.len(),
            min,
            max,
            avg: sum / self.history.len() as f64,
            current: self.previous_primary_rate,
            first_date: first.date.clone(),
            last_date: last.date.clone(),
        })
    }
}

/// Summary statistics over the stored history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Stats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    pub current: f64,
    pub first_date: String,
    pub last_date: String,
}
