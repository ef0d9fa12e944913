use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::quote::Quote;
use crate::status::LastRates;

/// Minimum day-over-day move, in percent, that earns a change annotation.
pub const CHANGE_THRESHOLD_PCT: f64 = 2.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
}

/// A significant move of the primary rate against the previous observation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ChangeAnnotation {
    pub direction: Direction,
    pub magnitude_pct: f64,
}

/// The normalized output of one aggregation run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RateReport {
    /// Local time of generation in the configured timezone.
    pub generated_at: DateTime<FixedOffset>,
    pub official_price: f64,
    /// USD quotes, ascending by price.
    pub quotes: Vec<Quote>,
    pub usd_average: f64,
    pub eur_quotes: Vec<Quote>,
    pub change: Option<ChangeAnnotation>,
}

impl RateReport {
    /// The pair shown in status snapshots.
    pub fn last_rates(&self) -> LastRates {
        LastRates {
            bcv: self.official_price,
            promedio: self.usd_average,
        }
    }

    pub fn has_estimates(&self) -> bool {
        self.quotes
            .iter()
            .chain(self.eur_quotes.iter())
            .any(|q| q.estimate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quote::{labels, Currency, SourceKind};
    use chrono::{TimeZone, Utc};

    fn sample_report() -> RateReport {
        let at = Utc.with_ymd_and_hms(2025, 1, 13, 13, 0, 0).unwrap();
        RateReport {
            generated_at: at.fixed_offset(),
            official_price: 100.0,
            quotes: vec![
                Quote::observed(SourceKind::PeerMarket, "Binance", Currency::Usd, 105.0, at),
                Quote::estimated(labels::ZELLE, Currency::Usd, 100.0, 1.08, at),
            ],
            usd_average: 104.33,
            eur_quotes: vec![],
            change: None,
        }
    }

    #[test]
    fn last_rates_projects_official_and_average() {
        let rates = sample_report().last_rates();
        assert_eq!(rates.bcv, 100.0);
        assert_eq!(rates.promedio, 104.33);
    }

    #[test]
    fn detects_estimates() {
        let mut report = sample_report();
        assert!(report.has_estimates());
        report.quotes.retain(|q| !q.estimate);
        assert!(!report.has_estimates());
    }

    #[test]
    fn report_json_roundtrip() {
        let report = sample_report();
        let json = serde_json::to_string(&report).unwrap();
        let parsed: RateReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, report);
    }
}
