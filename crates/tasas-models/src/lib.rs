pub mod config;
pub mod history;
pub mod quote;
pub mod report;
pub mod status;

pub use config::{EstimateMultipliers, RatesConfig, StoreConfig, TasasConfig};
pub use history::{HistoryEntry, PersistedState, Stats, MAX_HISTORY};
pub use quote::{labels, Currency, Quote, QuoteSet, SourceKind};
pub use report::{ChangeAnnotation, Direction, RateReport, CHANGE_THRESHOLD_PCT};
pub use status::{LastRates, StatusSnapshot};
