use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, FixedOffset};
use tasas_models::report::RateReport;
use tasas_models::status::LastRates;
use tasas_rates::render::{failure_markdown, report_markdown};
use tasas_rates::{AggregationError, RateAggregator};
use tasas_store::RateStore;

/// Wraps the aggregator for the chat, scheduler and dashboard, and remembers
/// when the last successful report was produced.
pub struct RateService {
    aggregator: Arc<RateAggregator>,
    last: Mutex<Option<(DateTime<FixedOffset>, LastRates)>>,
}

impl RateService {
    pub fn new(aggregator: Arc<RateAggregator>) -> Self {
        Self {
            aggregator,
            last: Mutex::new(None),
        }
    }

    pub fn store(&self) -> &Arc<RateStore> {
        self.aggregator.store()
    }

    pub fn timezone(&self) -> chrono_tz::Tz {
        self.aggregator.timezone()
    }

    pub async fn report(&self) -> Result<RateReport, AggregationError> {
        let report = self.aggregator.build_report().await?;
        *self.last.lock().unwrap_or_else(PoisonError::into_inner) =
            Some((report.generated_at, report.last_rates()));
        Ok(report)
    }

    /// Report rendered for chat, or the short failure message.
    pub async fn report_text(&self) -> String {
        match self.report().await {
            Ok(report) => report_markdown(&report),
            Err(e) => {
                tracing::error!(error = %e, "Rate report failed");
                failure_markdown(&e)
            }
        }
    }

    pub fn last_update(&self) -> Option<(DateTime<FixedOffset>, LastRates)> {
        *self.last.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
