use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tasas_rates::{build_http_client, SystemClock};
use tasas_store::RateStore;
use tokio_util::sync::CancellationToken;

use crate::app::App;
use crate::commands;
use crate::config::BotConfig;
use crate::dashboard;
use crate::error::BotError;
use crate::scheduler::Scheduler;
use crate::service::RateService;
use crate::telegram::{TelegramClient, TelegramSink};

/// The bot daemon. Runs the daily scheduler, answers chat commands and serves
/// the dashboard until cancelled.
pub struct Daemon {
    config: BotConfig,
    app: Arc<App>,
    telegram: Arc<TelegramClient>,
    cancel: CancellationToken,
}

impl Daemon {
    /// Wire every component from a validated configuration.
    pub fn new(config: BotConfig) -> Result<Self, BotError> {
        let store = Arc::new(RateStore::open(&config.store.path));
        let aggregator = tasas::build_aggregator_with_store(&config.rates, store)
            .map_err(|e| BotError::Config(e.to_string()))?;
        let service = Arc::new(RateService::new(Arc::new(aggregator)));

        let http = build_http_client(Duration::from_secs(config.rates.timeout_seconds))
            .map_err(|e| BotError::Config(e.to_string()))?;
        let telegram = Arc::new(TelegramClient::new(
            http,
            &config.telegram.api_url,
            &config.telegram.token,
        ));
        let sink = Arc::new(TelegramSink::new(telegram.clone(), config.telegram.chat_id));

        let scheduler = Arc::new(Scheduler::new(
            service.clone(),
            sink,
            Arc::new(SystemClock),
            config.schedule.dispatch_hour,
            Duration::from_secs(config.schedule.tick_seconds),
        ));

        let app = Arc::new(App {
            service,
            scheduler,
            chat_id: config.telegram.chat_id,
            log_file: config.logging.file.as_ref().map(PathBuf::from),
            log_lines: config.logging.dashboard_lines,
        });

        Ok(Self {
            config,
            app,
            telegram,
            cancel: CancellationToken::new(),
        })
    }

    /// Returns a CancellationToken that can be used to trigger shutdown.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn app(&self) -> &Arc<App> {
        &self.app
    }

    /// Run the daemon until cancelled.
    pub async fn run(&self) -> Result<(), BotError> {
        tracing::info!(
            chat_id = self.config.telegram.chat_id,
            dispatch_hour = self.config.schedule.dispatch_hour,
            timezone = %self.config.rates.timezone,
            "Tasas bot starting"
        );

        // Task 1: Daily dispatch
        if self.config.schedule.enabled {
            self.app.scheduler.start();
        }

        let mut join_set = tokio::task::JoinSet::new();

        // Task 2: Chat commands
        if self.config.telegram.commands_enabled {
            let app = self.app.clone();
            let telegram = self.telegram.clone();
            let poll_timeout = Duration::from_secs(self.config.telegram.poll_timeout_seconds);
            let cancel = self.cancel.clone();
            join_set.spawn(async move {
                commands::command_loop(app, telegram, poll_timeout, cancel).await;
            });
        }

        // Task 3: Dashboard
        if self.config.dashboard.enabled {
            let app = self.app.clone();
            let bind = self.config.dashboard.bind.clone();
            let cancel = self.cancel.clone();
            join_set.spawn(async move {
                if let Err(e) = dashboard::serve(&bind, app, cancel).await {
                    tracing::error!(error = %e, bind = %bind, "Dashboard failed");
                }
            });
        }

        tracing::info!("All bot tasks started");

        self.cancel.cancelled().await;
        self.app.scheduler.shutdown().await;
        while join_set.join_next().await.is_some() {}

        tracing::info!("Tasas bot stopped");
        Ok(())
    }
}
