use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tasas_models::config::TasasConfig;
use tasas_rates::render::{failure_markdown, report_markdown};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "tasas",
    about = "Print today's exchange-rate report without starting the bot"
)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/tasas.toml")]
    config: String,

    /// Print the report as JSON instead of Markdown
    #[arg(long)]
    json: bool,

    /// Pretty-print the output JSON
    #[arg(long, requires = "json")]
    pretty: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing (respects RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Load config; a missing file means defaults
    let config: TasasConfig = if Path::new(&cli.config).exists() {
        let config_str = std::fs::read_to_string(&cli.config)
            .with_context(|| format!("Failed to read config: {}", cli.config))?;
        toml::from_str(&config_str).with_context(|| "Failed to parse config")?
    } else {
        tracing::info!(path = %cli.config, "Config file not found, using defaults");
        TasasConfig::default()
    };

    let aggregator = tasas::build_aggregator(&config).context("Failed to build aggregator")?;

    let report = match tasas::fetch_report(&aggregator).await {
        Ok(report) => report,
        Err(e) => {
            eprintln!("{}", failure_markdown(&e));
            return Err(anyhow::anyhow!("Report failed: {e}"));
        }
    };

    let output = if cli.json && cli.pretty {
        serde_json::to_string_pretty(&report)?
    } else if cli.json {
        serde_json::to_string(&report)?
    } else {
        report_markdown(&report)
    };
    println!("{output}");

    Ok(())
}
