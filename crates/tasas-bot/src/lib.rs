pub mod app;
pub mod commands;
pub mod config;
pub mod daemon;
pub mod dashboard;
pub mod delivery;
pub mod error;
pub mod logging;
pub mod scheduler;
pub mod service;
pub mod telegram;

pub mod test_support;

pub use app::App;
pub use delivery::DeliverySink;
pub use error::BotError;
pub use scheduler::{DispatchGate, Scheduler, SchedulerState};
pub use service::RateService;
