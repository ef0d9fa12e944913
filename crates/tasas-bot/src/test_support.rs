//! Scripted collaborators for tests: a recording delivery sink and an app
//! wired to mock rate sources.

use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tasas_models::quote::{Currency, SourceKind};
use tasas_rates::test_support::MockSource;
use tasas_rates::{AggregatorSettings, FixedClock, RateAggregator, RateSource, RateSources};
use tasas_store::RateStore;

use crate::app::App;
use crate::delivery::DeliverySink;
use crate::error::BotError;
use crate::scheduler::Scheduler;
use crate::service::RateService;

/// Sink that keeps every delivered message in memory.
#[derive(Default)]
pub struct RecordingSink {
    messages: Mutex<Vec<String>>,
    fail: bool,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Records each message, then reports the delivery as failed.
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            messages: Mutex::new(Vec::new()),
            fail: true,
        })
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl DeliverySink for RecordingSink {
    async fn deliver(&self, text: &str) -> Result<(), BotError> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(text.to_string());
        if self.fail {
            Err(BotError::Telegram("delivery refused".to_string()))
        } else {
            Ok(())
        }
    }
}

/// A rate service over mock sources whose official USD leg is `official_usd`.
/// Every enrichment returns nothing, so Zelle/PayPal/Euro are estimates.
pub fn mock_service(
    official_usd: Arc<dyn RateSource>,
    state_file: &Path,
    now: DateTime<Utc>,
) -> Arc<RateService> {
    let sources = RateSources {
        official_usd,
        official_eur: MockSource::failing("official_eur", SourceKind::Official),
        peer_market: MockSource::quotes("peer_market", SourceKind::PeerMarket, vec![]),
        community: MockSource::quotes("community", SourceKind::CommunityScrape, vec![]),
    };
    let aggregator = RateAggregator::new(
        sources,
        Arc::new(RateStore::open(state_file)),
        Arc::new(FixedClock(now)),
        AggregatorSettings::default(),
    );
    Arc::new(RateService::new(Arc::new(aggregator)))
}

/// A complete app at `now` with an official rate of `official_price`.
pub fn mock_app(
    official_price: f64,
    state_file: &Path,
    log_file: Option<&Path>,
    now: DateTime<Utc>,
    sink: Arc<dyn DeliverySink>,
) -> Arc<App> {
    let service = mock_service(
        MockSource::official(Currency::Usd, official_price),
        state_file,
        now,
    );
    let scheduler = Arc::new(Scheduler::new(
        service.clone(),
        sink,
        Arc::new(FixedClock(now)),
        9,
        Duration::from_millis(10),
    ));
    Arc::new(App {
        service,
        scheduler,
        chat_id: 4242,
        log_file: log_file.map(Path::to_path_buf),
        log_lines: 50,
    })
}
