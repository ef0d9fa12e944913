use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tasas_models::quote::{Currency, Quote, QuoteSet, SourceKind};

use crate::error::FetchError;
use crate::source::{parse_price, RateSource};

/// Display names for the platform keys the peer-market API is known to use.
const PLATFORM_NAMES: &[(&str, &str)] = &[
    ("binance", "Binance"),
    ("bybit", "Bybit"),
    ("yadio", "Yadio"),
    ("airtm", "AirTM"),
    ("eldorado", "El Dorado"),
    ("el_dorado", "El Dorado"),
    ("syklo", "Syklo"),
    ("okx", "OKX"),
];

/// Client for the peer-to-peer market endpoint.
///
/// Expected payload:
///
/// ```json
/// { "platforms": { "binance": { "title": "Binance P2P", "price": 41.2 } } }
/// ```
pub struct PeerMarketClient {
    client: reqwest::Client,
    url: String,
}

impl PeerMarketClient {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl RateSource for PeerMarketClient {
    fn name(&self) -> &str {
        "peer_market"
    }

    fn kind(&self) -> SourceKind {
        SourceKind::PeerMarket
    }

    async fn fetch(&self) -> Result<QuoteSet, FetchError> {
        let response = self
            .client
            .get(&self.url)
            .query(&[("currency", "usd"), ("rounded_price", "true")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let quotes = parse_platforms(&body, Utc::now());
        tracing::debug!(count = quotes.len(), "Peer market quotes fetched");
        Ok(quotes)
    }
}

/// Turn a peer-market payload into USD quotes, in document order.
///
/// Malformed payloads yield no quotes rather than an error.
pub fn parse_platforms(body: &str, fetched_at: DateTime<Utc>) -> QuoteSet {
    let value: serde_json::Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = %e, "Peer market payload is not JSON");
            return Vec::new();
        }
    };

    let Some(platforms) = value.get("platforms").and_then(|p| p.as_object()) else {
        tracing::warn!("Peer market payload has no `platforms` object");
        return Vec::new();
    };

    platforms
        .iter()
        .filter_map(|(key, entry)| {
            let price = entry.get("price").and_then(parse_price)?;
            if price <= 0.0 {
                return None;
            }
            let title = entry.get("title").and_then(|t| t.as_str());
            Some(Quote::observed(
                SourceKind::PeerMarket,
                display_name(key, title),
                Currency::Usd,
                price,
                fetched_at,
            ))
        })
        .collect()
}

/// Known keys map to fixed names; anything else uses the source title, then the key.
fn display_name(key: &str, title: Option<&str>) -> String {
    let normalized = key.trim().to_lowercase();
    if let Some((_, name)) = PLATFORM_NAMES.iter().find(|(k, _)| *k == normalized) {
        return (*name).to_string();
    }

    match title.map(str::trim) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => key.to_string(),
    }
}
