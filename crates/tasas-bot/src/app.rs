use std::path::PathBuf;
use std::sync::Arc;

use tasas_models::status::StatusSnapshot;

use crate::error::BotError;
use crate::logging;
use crate::scheduler::Scheduler;
use crate::service::RateService;

/// Shared state behind the chat commands and the dashboard.
pub struct App {
    pub service: Arc<RateService>,
    pub scheduler: Arc<Scheduler>,
    pub chat_id: i64,
    pub log_file: Option<PathBuf>,
    pub log_lines: usize,
}

impl App {
    pub fn status(&self) -> StatusSnapshot {
        let last = self.service.last_update();
        StatusSnapshot {
            last_update: last.map(|(at, _)| at),
            last_rates: last.map(|(_, rates)| rates),
            scheduler_running: self.scheduler.is_running(),
            chat_id: self.chat_id,
            stats: self.service.store().stats(),
        }
    }

    /// Trailing lines of the log file; empty when file logging is off.
    pub fn recent_logs(&self) -> Result<Vec<String>, BotError> {
        match &self.log_file {
            Some(path) => logging::tail_lines(path, self.log_lines),
            None => Ok(Vec::new()),
        }
    }
}
