//! Weekday dispatch of the daily report.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Timelike, Weekday};
use chrono_tz::Tz;
use tasas_rates::Clock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::delivery::DeliverySink;
use crate::service::RateService;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
}

/// Decides whether a tick falls inside today's dispatch window.
///
/// Open on Monday to Friday during `hour` (local), until the day is claimed.
#[derive(Debug, Clone)]
pub struct DispatchGate {
    hour: u32,
    last_dispatched: Option<NaiveDate>,
}

impl DispatchGate {
    pub fn new(hour: u32) -> Self {
        Self {
            hour,
            last_dispatched: None,
        }
    }

    pub fn is_open<Z: TimeZone>(&self, local_now: &DateTime<Z>) -> bool {
        let business_day = !matches!(local_now.weekday(), Weekday::Sat | Weekday::Sun);
        business_day
            && local_now.hour() == self.hour
            && self.last_dispatched != Some(local_now.date_naive())
    }

    /// Close the gate for the rest of the local day if it is open now.
    pub fn try_claim<Z: TimeZone>(&mut self, local_now: &DateTime<Z>) -> bool {
        if !self.is_open(local_now) {
            return false;
        }
        self.last_dispatched = Some(local_now.date_naive());
        true
    }

    pub fn last_dispatched(&self) -> Option<NaiveDate> {
        self.last_dispatched
    }
}

struct Dispatcher {
    service: Arc<RateService>,
    sink: Arc<dyn DeliverySink>,
    clock: Arc<dyn Clock>,
    timezone: Tz,
    gate: Mutex<DispatchGate>,
}

impl Dispatcher {
    async fn tick(&self) -> bool {
        let local_now = self.clock.now().with_timezone(&self.timezone);
        // Claimed before dispatching so overlapping ticks cannot double-send.
        let claimed = self
            .gate
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .try_claim(&local_now);
        if !claimed {
            return false;
        }

        tracing::info!(date = %local_now.date_naive(), "Dispatch window open, sending daily report");
        let text = self.service.report_text().await;
        match self.sink.deliver(&text).await {
            Ok(()) => tracing::info!("Daily report delivered"),
            Err(e) => tracing::error!(error = %e, "Failed to deliver daily report"),
        }
        true
    }
}

struct RunningTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Polls the dispatch gate every tick while RUNNING.
pub struct Scheduler {
    dispatcher: Arc<Dispatcher>,
    tick: Duration,
    task: Mutex<Option<RunningTask>>,
}

impl Scheduler {
    pub fn new(
        service: Arc<RateService>,
        sink: Arc<dyn DeliverySink>,
        clock: Arc<dyn Clock>,
        dispatch_hour: u32,
        tick: Duration,
    ) -> Self {
        let timezone = service.timezone();
        Self {
            dispatcher: Arc::new(Dispatcher {
                service,
                sink,
                clock,
                timezone,
                gate: Mutex::new(DispatchGate::new(dispatch_hour)),
            }),
            tick,
            task: Mutex::new(None),
        }
    }

    /// IDLE → RUNNING. Returns false if already running. Needs a tokio runtime.
    pub fn start(&self) -> bool {
        let mut task = self.task.lock().unwrap_or_else(PoisonError::into_inner);
        if task.as_ref().is_some_and(|t| !t.handle.is_finished()) {
            return false;
        }

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(tick_loop(
            self.dispatcher.clone(),
            self.tick,
            cancel.clone(),
        ));
        *task = Some(RunningTask { cancel, handle });
        true
    }

    /// RUNNING → IDLE. Returns false if it was not running.
    pub fn stop(&self) -> bool {
        match self.take_task() {
            Some(task) => {
                task.cancel.cancel();
                true
            }
            None => false,
        }
    }

    /// Stop and wait for the polling task to finish.
    pub async fn shutdown(&self) {
        if let Some(task) = self.take_task() {
            task.cancel.cancel();
            if let Err(e) = task.handle.await {
                tracing::warn!(error = %e, "Scheduler task ended abnormally");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.state() == SchedulerState::Running
    }

    pub fn state(&self) -> SchedulerState {
        let task = self.task.lock().unwrap_or_else(PoisonError::into_inner);
        match task.as_ref() {
            Some(t) if !t.handle.is_finished() => SchedulerState::Running,
            _ => SchedulerState::Idle,
        }
    }

    /// Evaluate the gate once, dispatching if it is open.
    pub async fn tick(&self) -> bool {
        self.dispatcher.tick().await
    }

    pub fn last_dispatched(&self) -> Option<NaiveDate> {
        self.dispatcher
            .gate
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last_dispatched()
    }

    fn take_task(&self) -> Option<RunningTask> {
        self.task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn tick_loop(dispatcher: Arc<Dispatcher>, tick: Duration, cancel: CancellationToken) {
    tracing::info!(tick_seconds = tick.as_secs_f64(), "Scheduler started");

    // Check immediately on startup
    dispatcher.tick().await;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Scheduler shutting down");
                break;
            }
            _ = tokio::time::sleep(tick) => {
                dispatcher.tick().await;
            }
        }
    }
}
