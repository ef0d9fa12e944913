use serde::{Deserialize, Serialize};
use tasas_models::config::{RatesConfig, StoreConfig};

use crate::error::BotError;

/// Placeholder token shipped in example configs; treated as unset.
const PLACEHOLDER_TOKEN: &str = "your_bot_token_here";

/// Full configuration of the bot daemon.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct BotConfig {
    #[serde(default)]
    pub rates: RatesConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TelegramConfig {
    /// Bot token. Usually supplied through the `TOKEN` environment variable.
    #[serde(default)]
    pub token: String,
    /// Chat that receives the daily report. Overridden by `CHAT_ID`.
    #[serde(default)]
    pub chat_id: i64,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Long-poll timeout for `getUpdates`, in seconds.
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_seconds: u64,
    /// Answer chat commands. The daily dispatch works either way.
    #[serde(default = "default_true")]
    pub commands_enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduleConfig {
    /// Start the scheduler with the daemon.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Local hour (0-23) of the weekday dispatch.
    #[serde(default = "default_dispatch_hour")]
    pub dispatch_hour: u32,
    /// Interval in seconds between dispatch checks.
    #[serde(default = "default_tick_seconds")]
    pub tick_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_bind")]
    pub bind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log file mirrored from stderr and served by `/api/logs`. `None` disables it.
    #[serde(default = "default_log_file")]
    pub file: Option<String>,
    /// Number of trailing lines served by `/api/logs`.
    #[serde(default = "default_log_lines")]
    pub dashboard_lines: usize,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            chat_id: 0,
            api_url: default_api_url(),
            poll_timeout_seconds: default_poll_timeout(),
            commands_enabled: true,
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dispatch_hour: default_dispatch_hour(),
            tick_seconds: default_tick_seconds(),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind: default_bind(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: default_log_file(),
            dashboard_lines: default_log_lines(),
        }
    }
}

impl BotConfig {
    /// Parse a TOML document. Missing sections take their defaults.
    pub fn from_toml(text: &str) -> Result<Self, BotError> {
        toml::from_str(text).map_err(|e| BotError::Config(format!("Failed to parse config: {e}")))
    }

    /// Apply `TOKEN` and `CHAT_ID` overrides from a variable lookup.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), BotError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup("TOKEN").filter(|t| !t.trim().is_empty()) {
            self.telegram.token = token.trim().to_string();
        }
        if let Some(raw) = lookup("CHAT_ID").filter(|c| !c.trim().is_empty()) {
            self.telegram.chat_id = raw
                .trim()
                .parse()
                .map_err(|_| BotError::Config(format!("CHAT_ID must be numeric, got '{raw}'")))?;
        }
        Ok(())
    }

    /// Check the settings the daemon cannot run without.
    pub fn validate(&self) -> Result<(), BotError> {
        let token = self.telegram.token.trim();
        if token.is_empty() || token == PLACEHOLDER_TOKEN {
            return Err(BotError::Config(
                "Telegram bot token is not set (TOKEN)".to_string(),
            ));
        }
        if self.telegram.chat_id == 0 {
            return Err(BotError::Config("Chat id is not set (CHAT_ID)".to_string()));
        }
        if self.schedule.dispatch_hour > 23 {
            return Err(BotError::Config(format!(
                "dispatch_hour must be 0-23, got {}",
                self.schedule.dispatch_hour
            )));
        }
        if self.schedule.tick_seconds == 0 {
            return Err(BotError::Config("tick_seconds must be positive".to_string()));
        }
        self.rates.validate().map_err(BotError::Config)?;
        self.timezone()?;
        Ok(())
    }

    pub fn timezone(&self) -> Result<chrono_tz::Tz, BotError> {
        tasas::parse_timezone(&self.rates.timezone).map_err(|e| BotError::Config(e.to_string()))
    }
}

fn default_api_url() -> String {
    "https://api.telegram.org".to_string()
}
fn default_poll_timeout() -> u64 {
    30
}
fn default_true() -> bool {
    true
}
fn default_dispatch_hour() -> u32 {
    9
}
fn default_tick_seconds() -> u64 {
    60
}
fn default_bind() -> String {
    "0.0.0.0:5000".to_string()
}
fn default_log_file() -> Option<String> {
    Some("bot.log".to_string())
}
fn default_log_lines() -> usize {
    50
}
