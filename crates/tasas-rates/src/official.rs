use async_trait::async_trait;
use chrono::Utc;
use tasas_models::quote::{labels, Currency, Quote, QuoteSet, SourceKind};

use crate::error::FetchError;
use crate::source::{parse_price, RateSource};

/// Client for the official reference rate, bound to one currency leg.
///
/// Expects `GET {url}?currency=<usd|eur>&rounded_price=true` to answer with a
/// JSON object carrying a positive numeric `price`.
pub struct OfficialRateClient {
    client: reqwest::Client,
    url: String,
    currency: Currency,
    name: String,
}

impl OfficialRateClient {
    pub fn new(client: reqwest::Client, url: impl Into<String>, currency: Currency) -> Self {
        Self {
            client,
            url: url.into(),
            currency,
            name: format!("official_{}", currency.code()),
        }
    }
}

#[async_trait]
impl RateSource for OfficialRateClient {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Official
    }

    async fn fetch(&self) -> Result<QuoteSet, FetchError> {
        let response = self
            .client
            .get(&self.url)
            .query(&[("currency", self.currency.code()), ("rounded_price", "true")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body: serde_json::Value = response.json().await?;
        let price = body
            .get("price")
            .and_then(parse_price)
            .ok_or_else(|| FetchError::InvalidPayload("missing numeric `price`".to_string()))?;

        if price <= 0.0 {
            return Err(FetchError::InvalidPayload(format!(
                "non-positive price {price}"
            )));
        }

        tracing::debug!(source = %self.name, price, "Official rate fetched");

        Ok(vec![Quote::observed(
            SourceKind::Official,
            labels::OFFICIAL,
            self.currency,
            price,
            Utc::now(),
        )])
    }
}
