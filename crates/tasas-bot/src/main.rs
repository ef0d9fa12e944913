use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;

use tasas_bot::config::BotConfig;
use tasas_bot::daemon::Daemon;
use tasas_bot::logging;

#[derive(Parser, Debug)]
#[command(
    name = "tasas-bot",
    about = "Telegram bot that posts the daily exchange-rate report and answers rate queries"
)]
struct Cli {
    /// Path to bot configuration file
    #[arg(short, long, default_value = "config/tasas.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // A missing file is fine: TOKEN and CHAT_ID may come from the environment.
    let mut config = if Path::new(&cli.config).exists() {
        let config_str = std::fs::read_to_string(&cli.config)
            .with_context(|| format!("Failed to read config: {}", cli.config))?;
        BotConfig::from_toml(&config_str)?
    } else {
        BotConfig::default()
    };
    config.apply_env(|key| std::env::var(key).ok())?;
    config.validate()?;

    logging::init(&config.logging).context("Failed to initialize logging")?;
    tracing::info!(config = %cli.config, "Configuration loaded");

    let daemon = Daemon::new(config).context("Failed to build bot")?;
    let cancel = daemon.cancel_token();

    // Handle shutdown signals
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("Received shutdown signal");
        cancel.cancel();
    });

    daemon
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("Daemon error: {e}"))?;

    Ok(())
}
