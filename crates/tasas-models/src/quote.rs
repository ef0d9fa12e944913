use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which provider a quote came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Official,
    PeerMarket,
    CommunityScrape,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Official => "official",
            SourceKind::PeerMarket => "peer_market",
            SourceKind::CommunityScrape => "community_scrape",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Eur,
}

impl Currency {
    /// Lower-case ISO code, as the rate APIs expect it in query strings.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "usd",
            Currency::Eur => "eur",
        }
    }
}

/// Display labels shared between the sources and the aggregator.
///
/// The aggregator resolves the Zelle/PayPal/Euro legs by label, so the
/// community scraper must emit exactly these strings.
pub mod labels {
    pub const OFFICIAL: &str = "BCV";
    pub const ZELLE: &str = "Zelle";
    pub const PAYPAL: &str = "PayPal";
    pub const DOLLAR: &str = "Dólar";
    pub const EURO: &str = "Euro";
}

/// One source's price observation for a currency leg.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Quote {
    pub source: SourceKind,
    pub label: String,
    pub currency: Currency,
    /// Price in local currency units per one unit of `currency`. Always positive.
    pub price: f64,
    pub fetched_at: DateTime<Utc>,
    /// True when the price was derived from the official rate rather than observed.
    #[serde(default)]
    pub estimate: bool,
}

impl Quote {
    /// A price observed directly from a source.
    pub fn observed(
        source: SourceKind,
        label: impl Into<String>,
        currency: Currency,
        price: f64,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        Self {
            source,
            label: label.into(),
            currency,
            price,
            fetched_at,
            estimate: false,
        }
    }

    /// A price derived as a multiple of the official rate.
    pub fn estimated(
        label: impl Into<String>,
        currency: Currency,
        official_price: f64,
        multiplier: f64,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        Self {
            source: SourceKind::Official,
            label: label.into(),
            currency,
            price: official_price * multiplier,
            fetched_at,
            estimate: true,
        }
    }
}

/// Quotes returned by a single fetch, in source-fetch order.
pub type QuoteSet = Vec<Quote>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimated_quote_is_marked_and_derived() {
        let q = Quote::estimated(labels::ZELLE, Currency::Usd, 100.0, 1.08, Utc::now());
        assert!(q.estimate);
        assert_eq!(q.source, SourceKind::Official);
        assert!((q.price - 108.0).abs() < 1e-9);
    }

    #[test]
    fn currency_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Currency::Eur).unwrap(), "\"EUR\"");
        assert_eq!(Currency::Usd.code(), "usd");
    }

    #[test]
    fn estimate_flag_defaults_to_false() {
        let json = r#"{
            "source": "peer_market",
            "label": "Binance",
            "currency": "USD",
            "price": 105.0,
            "fetched_at": "2025-01-13T13:00:00Z"
        }"#;
        let q: Quote = serde_json::from_str(json).unwrap();
        assert!(!q.estimate);
        assert_eq!(q.source, SourceKind::PeerMarket);
    }
}
