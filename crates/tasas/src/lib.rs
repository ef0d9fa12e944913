//! Tasas - daily Venezuelan exchange-rate reports
//!
//! Collects the official BCV rate, peer-to-peer market quotes and community
//! figures for Zelle, PayPal and the euro, merges them into one report and
//! remembers the primary rate to flag significant day-over-day moves.
//!
//! # Library Usage
//!
//! ```rust,no_run
//! use tasas::models::config::TasasConfig;
//! use tasas::rates::render::report_markdown;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let aggregator = tasas::build_aggregator(&TasasConfig::default())?;
//! let report = tasas::fetch_report(&aggregator).await?;
//! println!("{}", report_markdown(&report));
//! # Ok(())
//! # }
//! ```

pub use tasas_models as models;
pub use tasas_rates as rates;
pub use tasas_store as store;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono_tz::Tz;
use tasas_models::config::{RatesConfig, TasasConfig};
use tasas_models::quote::Currency;
use tasas_models::report::RateReport;
use tasas_rates::{
    build_http_client, AggregationError, AggregatorSettings, CommunityScrapeClient,
    OfficialRateClient, PeerMarketClient, RateAggregator, RateSources, SystemClock,
};
use tasas_store::RateStore;

/// Parse an IANA timezone name such as `America/Caracas`.
pub fn parse_timezone(name: &str) -> Result<Tz, anyhow::Error> {
    name.parse::<Tz>()
        .map_err(|e| anyhow::anyhow!("Unknown timezone '{name}': {e}"))
}

/// Build the four HTTP-backed rate sources over one shared client.
pub fn build_sources(config: &RatesConfig) -> Result<RateSources, anyhow::Error> {
    let client = build_http_client(Duration::from_secs(config.timeout_seconds))
        .context("Failed to build HTTP client")?;

    Ok(RateSources {
        official_usd: Arc::new(OfficialRateClient::new(
            client.clone(),
            config.official_url.clone(),
            Currency::Usd,
        )),
        official_eur: Arc::new(OfficialRateClient::new(
            client.clone(),
            config.official_url.clone(),
            Currency::Eur,
        )),
        peer_market: Arc::new(PeerMarketClient::new(
            client.clone(),
            config.peer_market_url.clone(),
        )),
        community: Arc::new(CommunityScrapeClient::new(client, config.community_url.clone())),
    })
}

/// Aggregator settings derived from the rates configuration.
pub fn aggregator_settings(config: &RatesConfig) -> Result<AggregatorSettings, anyhow::Error> {
    config.validate().map_err(|e| anyhow::anyhow!(e))?;
    Ok(AggregatorSettings {
        source_timeout: Duration::from_secs(config.timeout_seconds),
        multipliers: config.multipliers,
        timezone: parse_timezone(&config.timezone)?,
    })
}

/// Build a RateAggregator from configuration, opening the state file it names.
pub fn build_aggregator(config: &TasasConfig) -> Result<RateAggregator, anyhow::Error> {
    let store = Arc::new(RateStore::open(&config.store.path));
    build_aggregator_with_store(&config.rates, store)
}

/// Build a RateAggregator over an already-open store.
pub fn build_aggregator_with_store(
    config: &RatesConfig,
    store: Arc<RateStore>,
) -> Result<RateAggregator, anyhow::Error> {
    let sources = build_sources(config)?;
    let settings = aggregator_settings(config)?;
    Ok(RateAggregator::new(
        sources,
        store,
        Arc::new(SystemClock),
        settings,
    ))
}

/// Produce one report with the given aggregator.
pub async fn fetch_report(aggregator: &RateAggregator) -> Result<RateReport, AggregationError> {
    aggregator.build_report().await
}
