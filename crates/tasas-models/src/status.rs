use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::history::Stats;

/// The official rate and the general average of the latest report.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LastRates {
    pub bcv: f64,
    pub promedio: f64,
}

/// Read-only projection served to the chat and dashboard collaborators.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusSnapshot {
    pub last_update: Option<DateTime<FixedOffset>>,
    pub last_rates: Option<LastRates>,
    pub scheduler_running: bool,
    pub chat_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<Stats>,
}
