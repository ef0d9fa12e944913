//! Minimal Telegram Bot API client: `sendMessage` and long-polling `getUpdates`.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::delivery::DeliverySink;
use crate::error::BotError;

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Chat {
    pub id: i64,
}

pub struct TelegramClient {
    client: reqwest::Client,
    base_url: String,
}

impl TelegramClient {
    /// `api_url` is the API root, e.g. `https://api.telegram.org`.
    pub fn new(client: reqwest::Client, api_url: &str, token: &str) -> Self {
        Self {
            client,
            base_url: format!("{}/bot{token}", api_url.trim_end_matches('/')),
        }
    }

    /// Send a Markdown message, optionally as a reply and with a reply keyboard.
    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_to: Option<i64>,
        reply_markup: Option<&Value>,
    ) -> Result<(), BotError> {
        let mut body = json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "Markdown",
        });
        if let Some(message_id) = reply_to {
            body["reply_to_message_id"] = json!(message_id);
        }
        if let Some(markup) = reply_markup {
            body["reply_markup"] = markup.clone();
        }

        let response = self
            .client
            .post(format!("{}/sendMessage", self.base_url))
            .json(&body)
            .send()
            .await?;
        let _: Value = Self::unwrap_response(response).await?;
        Ok(())
    }

    /// Long-poll for updates after `offset`.
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        poll_timeout: Duration,
    ) -> Result<Vec<Update>, BotError> {
        let mut query = vec![("timeout", poll_timeout.as_secs().to_string())];
        if let Some(offset) = offset {
            query.push(("offset", offset.to_string()));
        }

        let response = self
            .client
            .get(format!("{}/getUpdates", self.base_url))
            .query(&query)
            // The server holds the request for up to `poll_timeout`.
            .timeout(poll_timeout + Duration::from_secs(10))
            .send()
            .await?;
        Self::unwrap_response(response).await
    }

    async fn unwrap_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, BotError> {
        let status = response.status();
        let text = response.text().await?;
        let parsed: ApiResponse<T> = serde_json::from_str(&text).map_err(|e| {
            BotError::Telegram(format!("HTTP {status}: unexpected response body: {e}"))
        })?;

        match (parsed.ok, parsed.result) {
            (true, Some(result)) => Ok(result),
            _ => Err(BotError::Telegram(format!(
                "HTTP {status}: {}",
                parsed
                    .description
                    .unwrap_or_else(|| "request was not ok".to_string())
            ))),
        }
    }
}

/// Delivers reports to one configured chat.
pub struct TelegramSink {
    client: std::sync::Arc<TelegramClient>,
    chat_id: i64,
}

impl TelegramSink {
    pub fn new(client: std::sync::Arc<TelegramClient>, chat_id: i64) -> Self {
        Self { client, chat_id }
    }
}

#[async_trait]
impl DeliverySink for TelegramSink {
    async fn deliver(&self, text: &str) -> Result<(), BotError> {
        self.client.send_message(self.chat_id, text, None, None).await
    }
}
