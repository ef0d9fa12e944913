use serde::{Deserialize, Serialize};

/// Configuration shared by the one-shot CLI and the bot daemon.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TasasConfig {
    #[serde(default)]
    pub rates: RatesConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

/// Where the rate sources live and how long to wait for them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RatesConfig {
    /// Official-rate endpoint. Queried once per currency leg.
    #[serde(default = "default_official_url")]
    pub official_url: String,
    /// Peer-to-peer market endpoint returning a `platforms` mapping.
    #[serde(default = "default_peer_market_url")]
    pub peer_market_url: String,
    /// Community page scraped for Zelle/PayPal/Euro figures.
    #[serde(default = "default_community_url")]
    pub community_url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// IANA timezone used for report dates and the dispatch window.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default)]
    pub multipliers: EstimateMultipliers,
}

impl Default for RatesConfig {
    fn default() -> Self {
        Self {
            official_url: default_official_url(),
            peer_market_url: default_peer_market_url(),
            community_url: default_community_url(),
            timeout_seconds: default_timeout(),
            timezone: default_timezone(),
            multipliers: EstimateMultipliers::default(),
        }
    }
}

impl RatesConfig {
    /// Reject settings that would make every report fail or produce
    /// non-positive estimates.
    pub fn validate(&self) -> Result<(), String> {
        if self.timeout_seconds == 0 {
            return Err("rates.timeout_seconds must be positive".to_string());
        }
        let multipliers = [
            ("zelle", self.multipliers.zelle),
            ("paypal", self.multipliers.paypal),
            ("euro", self.multipliers.euro),
        ];
        for (name, value) in multipliers {
            if !(value.is_finite() && value > 0.0) {
                return Err(format!(
                    "rates.multipliers.{name} must be a positive number, got {value}"
                ));
            }
        }
        Ok(())
    }
}

/// Multipliers on the official price used when a leg has no observed quote.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct EstimateMultipliers {
    #[serde(default = "default_zelle")]
    pub zelle: f64,
    #[serde(default = "default_paypal")]
    pub paypal: f64,
    #[serde(default = "default_euro")]
    pub euro: f64,
}

impl Default for EstimateMultipliers {
    fn default() -> Self {
        Self {
            zelle: default_zelle(),
            paypal: default_paypal(),
            euro: default_euro(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreConfig {
    /// Path to the JSON state file.
    #[serde(default = "default_state_path")]
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_state_path(),
        }
    }
}

fn default_official_url() -> String {
    "https://pydolarve.org/api/v2/tipo-cambio".to_string()
}
fn default_peer_market_url() -> String {
    "https://pydolarve.org/api/v2/market-p2p".to_string()
}
fn default_community_url() -> String {
    "https://clptoday.com".to_string()
}
fn default_timeout() -> u64 {
    10
}
fn default_timezone() -> String {
    "America/Caracas".to_string()
}
fn default_zelle() -> f64 {
    1.08
}
fn default_paypal() -> f64 {
    1.15
}
fn default_euro() -> f64 {
    1.10
}
fn default_state_path() -> String {
    "rates_data.json".to_string()
}
