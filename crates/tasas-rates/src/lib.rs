pub mod aggregator;
pub mod change;
pub mod clock;
pub mod community;
pub mod error;
pub mod official;
pub mod peer_market;
pub mod render;
pub mod source;

pub mod test_support;

pub use aggregator::{AggregatorSettings, RateAggregator, RateSources};
pub use change::classify;
pub use clock::{Clock, FixedClock, SystemClock};
pub use community::CommunityScrapeClient;
pub use error::{AggregationError, FetchError};
pub use official::OfficialRateClient;
pub use peer_market::PeerMarketClient;
pub use source::{build_http_client, RateSource};
