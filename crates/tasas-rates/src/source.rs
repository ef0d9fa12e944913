use std::time::Duration;

use async_trait::async_trait;
use tasas_models::quote::{QuoteSet, SourceKind};

use crate::error::FetchError;

/// A provider of exchange-rate quotes. Mockable for testing.
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;
    fn kind(&self) -> SourceKind;

    async fn fetch(&self) -> Result<QuoteSet, FetchError>;
}

/// Build the HTTP client shared by all sources.
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, FetchError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("tasas/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| FetchError::Transport(format!("Failed to create HTTP client: {e}")))
}

/// Read a price that may be a JSON number or a numeric string (comma decimals allowed).
pub(crate) fn parse_price(value: &serde_json::Value) -> Option<f64> {
    let price = match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().replace(',', ".").parse::<f64>().ok(),
        _ => None,
    };
    price.filter(|p| p.is_finite())
}
