//! Chat command routing and the long-polling update loop.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tasas_rates::render::status_markdown;
use tokio_util::sync::CancellationToken;

use crate::app::App;
use crate::telegram::{TelegramClient, Update};

pub const BUTTON_RATES: &str = "💰 Tasas";
pub const BUTTON_REFRESH: &str = "🔄 Actualizar";
pub const BUTTON_HELP: &str = "❓ Ayuda";
pub const BUTTON_STATUS: &str = "📡 Estado";

const WELCOME: &str = "¡Hola! 👋 Usa los botones para ver tasas o ayuda.";
const HELP: &str = "Usa los botones para ver tasas o estado del bot.";
const UNKNOWN: &str = "No entiendo ese comando. Usa los botones abajo.";

/// Pause after a failed `getUpdates` before polling again.
const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Rates,
    Status,
    Unknown,
}

impl Command {
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        match text {
            BUTTON_RATES | BUTTON_REFRESH => return Command::Rates,
            BUTTON_HELP => return Command::Help,
            BUTTON_STATUS => return Command::Status,
            _ => {}
        }

        let Some(command) = text.strip_prefix('/') else {
            return Command::Unknown;
        };
        // "/tasas@MyBot extra" → "tasas"
        let name = command
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .split('@')
            .next()
            .unwrap_or_default();
        match name.to_lowercase().as_str() {
            "start" => Command::Start,
            "help" | "ayuda" => Command::Help,
            "tasas" => Command::Rates,
            "status" | "estado" => Command::Status,
            _ => Command::Unknown,
        }
    }
}

/// The two-row reply keyboard attached to every reply.
pub fn main_keyboard() -> Value {
    json!({
        "keyboard": [
            [{"text": BUTTON_RATES}, {"text": BUTTON_REFRESH}],
            [{"text": BUTTON_HELP}, {"text": BUTTON_STATUS}],
        ],
        "resize_keyboard": true,
    })
}

/// Text of the reply to a command.
pub async fn respond(app: &App, command: Command) -> String {
    match command {
        Command::Start => WELCOME.to_string(),
        Command::Help => HELP.to_string(),
        Command::Rates => app.service.report_text().await,
        Command::Status => status_markdown(&app.status()),
        Command::Unknown => UNKNOWN.to_string(),
    }
}

/// Answer one update. Updates without text are ignored.
pub async fn handle_update(app: &App, telegram: &TelegramClient, update: &Update) {
    let Some(message) = &update.message else {
        return;
    };
    let Some(text) = &message.text else {
        return;
    };

    let command = Command::parse(text);
    tracing::info!(chat_id = message.chat.id, ?command, "Chat command received");

    let reply = respond(app, command).await;
    if let Err(e) = telegram
        .send_message(
            message.chat.id,
            &reply,
            Some(message.message_id),
            Some(&main_keyboard()),
        )
        .await
    {
        tracing::error!(chat_id = message.chat.id, error = %e, "Failed to send reply");
    }
}

/// Long-poll `getUpdates` and answer each message until cancelled.
pub async fn command_loop(
    app: Arc<App>,
    telegram: Arc<TelegramClient>,
    poll_timeout: Duration,
    cancel: CancellationToken,
) {
    tracing::info!("Command loop started");
    let mut offset: Option<i64> = None;

    loop {
        let updates = tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Command loop shutting down");
                break;
            }
            result = telegram.get_updates(offset, poll_timeout) => result,
        };

        match updates {
            Ok(updates) => {
                for update in updates {
                    offset = Some(update.update_id + 1);
                    // Each command runs on its own task so a slow report does not block the poll.
                    let app = app.clone();
                    let telegram = telegram.clone();
                    tokio::spawn(async move {
                        handle_update(&app, &telegram, &update).await;
                    });
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "getUpdates failed, retrying");
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(POLL_RETRY_DELAY) => {}
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_slash_commands() {
        assert_eq!(Command::parse("/start"), Command::Start);
        assert_eq!(Command::parse("/tasas"), Command::Rates);
        assert_eq!(Command::parse("/status"), Command::Status);
        assert_eq!(Command::parse("/help"), Command::Help);
        assert_eq!(Command::parse("/tasas@TasasBot"), Command::Rates);
        assert_eq!(Command::parse("  /TASAS ahora "), Command::Rates);
    }

    #[test]
    fn parses_keyboard_buttons() {
        assert_eq!(Command::parse(BUTTON_RATES), Command::Rates);
        assert_eq!(Command::parse(BUTTON_REFRESH), Command::Rates);
        assert_eq!(Command::parse(BUTTON_HELP), Command::Help);
        assert_eq!(Command::parse(BUTTON_STATUS), Command::Status);
    }

    #[test]
    fn anything_else_is_unknown() {
        assert_eq!(Command::parse("hola"), Command::Unknown);
        assert_eq!(Command::parse("/"), Command::Unknown);
        assert_eq!(Command::parse("/precio"), Command::Unknown);
        assert_eq!(Command::parse("tasas"), Command::Unknown);
    }

    #[test]
    fn keyboard_has_two_rows_of_two() {
        let keyboard = main_keyboard();
        let rows = keyboard["keyboard"].as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|row| row.as_array().unwrap().len() == 2));
        assert_eq!(rows[1][1]["text"], BUTTON_STATUS);
        assert_eq!(keyboard["resize_keyboard"], true);
    }
}
