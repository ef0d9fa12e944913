use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tasas_models::config::EstimateMultipliers;
use tasas_models::quote::{labels, Currency, Quote, QuoteSet};
use tasas_models::report::RateReport;
use tasas_store::RateStore;
use tracing::{info, warn};

use crate::change::classify;
use crate::clock::Clock;
use crate::error::{AggregationError, FetchError};
use crate::source::RateSource;

/// The sources consulted for one report.
///
/// The official source is queried once per currency leg, so it appears twice.
#[derive(Clone)]
pub struct RateSources {
    pub official_usd: Arc<dyn RateSource>,
    pub official_eur: Arc<dyn RateSource>,
    pub peer_market: Arc<dyn RateSource>,
    pub community: Arc<dyn RateSource>,
}

#[derive(Debug, Clone, Copy)]
pub struct AggregatorSettings {
    /// Upper bound for any single source call.
    pub source_timeout: Duration,
    pub multipliers: EstimateMultipliers,
    /// Timezone for report timestamps and history dates.
    pub timezone: Tz,
}

impl Default for AggregatorSettings {
    fn default() -> Self {
        Self {
            source_timeout: Duration::from_secs(10),
            multipliers: EstimateMultipliers::default(),
            timezone: chrono_tz::America::Caracas,
        }
    }
}

/// Merges the rate sources into a [`RateReport`] and records the primary rate.
///
/// Only the official USD source is required. Every other source degrades to a
/// derived estimate when it fails. Safe to call concurrently: all mutation
/// goes through the store's lock.
pub struct RateAggregator {
    sources: RateSources,
    store: Arc<RateStore>,
    clock: Arc<dyn Clock>,
    settings: AggregatorSettings,
}

impl RateAggregator {
    pub fn new(
        sources: RateSources,
        store: Arc<RateStore>,
        clock: Arc<dyn Clock>,
        settings: AggregatorSettings,
    ) -> Self {
        Self {
            sources,
            store,
            clock,
            settings,
        }
    }

    pub fn store(&self) -> &Arc<RateStore> {
        &self.store
    }

    pub fn timezone(&self) -> Tz {
        self.settings.timezone
    }

    /// Build a fresh report.
    ///
    /// Fails only when the official USD rate is unavailable, in which case the
    /// store is left untouched.
    pub async fn build_report(&self) -> Result<RateReport, AggregationError> {
        let start = Instant::now();

        // 1. Primary rate gates everything else
        let official_price = self
            .fetch(&self.sources.official_usd)
            .await
            .and_then(|set| first_positive(&set, Currency::Usd))
            .map(|q| q.price)
            .map_err(|e| {
                warn!(error = %e, "Official rate unavailable, aborting report");
                AggregationError::PrimarySourceUnavailable(e)
            })?;

        // 2. Best-effort enrichments, concurrently
        let (peer, community) = tokio::join!(
            self.fetch_best_effort(&self.sources.peer_market),
            self.fetch_best_effort(&self.sources.community),
        );

        let now = self.clock.now();

        // 3-5. USD leg
        let quotes = self.resolve_usd(official_price, peer, &community, now);
        let usd_average = average(official_price, &quotes);

        // 6. EUR leg
        let eur_quotes = self.resolve_eur(official_price, &community, now).await;

        // 7-8. Record the primary rate and compare against the baseline it
        // replaced, under one lock so concurrent reports chain correctly.
        let local_now = now.with_timezone(&self.settings.timezone);
        let previous = self.store.save_at(official_price, local_now);
        let change = classify(previous, official_price);

        info!(
            official_price,
            usd_average,
            usd_quotes = quotes.len(),
            eur_quotes = eur_quotes.len(),
            changed = change.is_some(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Rate report built"
        );

        Ok(RateReport {
            generated_at: local_now.fixed_offset(),
            official_price,
            quotes,
            usd_average,
            eur_quotes,
            change,
        })
    }

    async fn fetch(&self, source: &Arc<dyn RateSource>) -> Result<QuoteSet, FetchError> {
        match tokio::time::timeout(self.settings.source_timeout, source.fetch()).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout),
        }
    }

    async fn fetch_best_effort(&self, source: &Arc<dyn RateSource>) -> QuoteSet {
        match self.fetch(source).await {
            Ok(quotes) => quotes,
            Err(e) => {
                warn!(
                    source = source.name(),
                    kind = source.kind().as_str(),
                    error = %e,
                    "Source failed, continuing without it"
                );
                Vec::new()
            }
        }
    }

    fn resolve_usd(
        &self,
        official_price: f64,
        peer: QuoteSet,
        community: &[Quote],
        now: DateTime<Utc>,
    ) -> Vec<Quote> {
        let multipliers = self.settings.multipliers;
        let mut quotes: Vec<Quote> = peer
            .into_iter()
            .filter(|q| q.currency == Currency::Usd && q.price > 0.0)
            .collect();

        let zelle = find_labeled(community, labels::ZELLE, Currency::Usd);
        let paypal = find_labeled(community, labels::PAYPAL, Currency::Usd);

        // A generic dollar figure only stands in when neither specific one was found.
        if zelle.is_none() && paypal.is_none() {
            if let Some(dollar) = find_labeled(community, labels::DOLLAR, Currency::Usd) {
                quotes.push(dollar);
            }
        }

        quotes.push(zelle.unwrap_or_else(|| {
            Quote::estimated(labels::ZELLE, Currency::Usd, official_price, multipliers.zelle, now)
        }));
        quotes.push(paypal.unwrap_or_else(|| {
            Quote::estimated(labels::PAYPAL, Currency::Usd, official_price, multipliers.paypal, now)
        }));

        // Stable: ties keep fetch order.
        quotes.sort_by(|a, b| a.price.total_cmp(&b.price));
        quotes
    }

    async fn resolve_eur(
        &self,
        official_price: f64,
        community: &[Quote],
        now: DateTime<Utc>,
    ) -> Vec<Quote> {
        if let Some(scraped) = community
            .iter()
            .find(|q| q.currency == Currency::Eur && q.price > 0.0)
        {
            return vec![scraped.clone()];
        }

        let official_eur = self
            .fetch(&self.sources.official_eur)
            .await
            .and_then(|set| first_positive(&set, Currency::Eur));

        match official_eur {
            Ok(quote) => vec![quote],
            Err(e) => {
                warn!(error = %e, "Official EUR rate unavailable, using estimate");
                vec![Quote::estimated(
                    labels::EURO,
                    Currency::Eur,
                    official_price,
                    self.settings.multipliers.euro,
                    now,
                )]
            }
        }
    }
}

fn first_positive(set: &[Quote], currency: Currency) -> Result<Quote, FetchError> {
    set.iter()
        .find(|q| q.currency == currency && q.price > 0.0)
        .cloned()
        .ok_or_else(|| {
            FetchError::InvalidPayload(format!("no positive {} price", currency.code()))
        })
}

fn find_labeled(quotes: &[Quote], label: &str, currency: Currency) -> Option<Quote> {
    quotes
        .iter()
        .find(|q| q.label == label && q.currency == currency && q.price > 0.0)
        .cloned()
}

/// Unweighted mean of the official price and every quote price.
fn average(official_price: f64, quotes: &[Quote]) -> f64 {
    let sum: f64 = official_price + quotes.iter().map(|q| q.price).sum::<f64>();
    sum / (quotes.len() + 1) as f64
}
