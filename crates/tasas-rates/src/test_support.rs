//! Mock sources and fixtures for exercising the aggregator without network access.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use tasas_models::quote::{Currency, Quote, QuoteSet, SourceKind};

use crate::error::FetchError;
use crate::source::RateSource;

/// What a [`MockSource`] does when fetched.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    Quotes(QuoteSet),
    Fail(FetchError),
    /// Sleep before answering with the given quotes.
    Delay(Duration, QuoteSet),
}

/// A scripted [`RateSource`] that counts its calls.
pub struct MockSource {
    name: String,
    kind: SourceKind,
    behavior: MockBehavior,
    calls: AtomicUsize,
}

impl MockSource {
    pub fn new(name: &str, kind: SourceKind, behavior: MockBehavior) -> Self {
        Self {
            name: name.to_string(),
            kind,
            behavior,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn quotes(name: &str, kind: SourceKind, quotes: QuoteSet) -> Arc<Self> {
        Arc::new(Self::new(name, kind, MockBehavior::Quotes(quotes)))
    }

    pub fn failing(name: &str, kind: SourceKind) -> Arc<Self> {
        Arc::new(Self::new(
            name,
            kind,
            MockBehavior::Fail(FetchError::Transport("mock failure".to_string())),
        ))
    }

    pub fn delayed(name: &str, kind: SourceKind, delay: Duration, quotes: QuoteSet) -> Arc<Self> {
        Arc::new(Self::new(name, kind, MockBehavior::Delay(delay, quotes)))
    }

    /// An official source answering with a single price.
    pub fn official(currency: Currency, price: f64) -> Arc<Self> {
        Self::quotes(
            &format!("official_{}", currency.code()),
            SourceKind::Official,
            vec![quote(SourceKind::Official, "BCV", currency, price)],
        )
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RateSource for MockSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> SourceKind {
        self.kind
    }

    async fn fetch(&self) -> Result<QuoteSet, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            MockBehavior::Quotes(quotes) => Ok(quotes.clone()),
            MockBehavior::Fail(e) => Err(e.clone()),
            MockBehavior::Delay(delay, quotes) => {
                tokio::time::sleep(*delay).await;
                Ok(quotes.clone())
            }
        }
    }
}

/// An observed quote stamped at [`test_instant`].
pub fn quote(source: SourceKind, label: &str, currency: Currency, price: f64) -> Quote {
    Quote::observed(source, label, currency, price, test_instant())
}

/// Monday 2025-01-13 13:00 UTC (09:00 in Caracas).
pub fn test_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 13, 13, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}
