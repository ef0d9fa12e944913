use async_trait::async_trait;

use crate::error::BotError;

/// Where rendered reports are sent. Mockable for testing.
#[async_trait]
pub trait DeliverySink: Send + Sync {
    async fn deliver(&self, text: &str) -> Result<(), BotError>;
}
