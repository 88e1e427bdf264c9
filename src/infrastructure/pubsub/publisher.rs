//! Redis Pub/Sub publisher.
//!
//! Publishes each event as JSON on the channel named after its scope.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use crate::domain::{ChatEvent, EventPublisher, EventScope};
use crate::shared::error::AppError;

#[derive(Clone)]
pub struct RedisEventPublisher {
    redis: ConnectionManager,
}

impl RedisEventPublisher {
    pub fn new(redis: ConnectionManager) -> Self {
        Self { redis }
    }

    /// Round-trip a PING, used by readiness checks.
    pub async fn ping(&self) -> Result<(), AppError> {
        let mut conn = self.redis.clone();
        redis::cmd("PING").query_async::<String>(&mut conn).await?;
        Ok(())
    }
}

#[async_trait]
impl EventPublisher for RedisEventPublisher {
    async fn publish(&self, scope: &EventScope, event: &ChatEvent) -> Result<(), AppError> {
        let channel = scope.name();
        let payload = serde_json::to_string(event)?;

        let mut conn = self.redis.clone();
        let receivers: u32 = conn.publish(&channel, payload).await?;

        tracing::debug!(
            channel = %channel,
            event_type = event.event_name(),
            receivers = receivers,
            "Published event"
        );

        Ok(())
    }
}
