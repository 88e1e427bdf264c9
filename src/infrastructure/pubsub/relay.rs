//! Redis Pub/Sub relay.
//!
//! Forwards every event published on the shared bus into this process's
//! websocket gateway.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use redis::Client;
use tokio::task::JoinHandle;

use super::patterns;
use crate::domain::{EventScope, LOBBY_SCOPE};
use crate::presentation::websocket::Gateway;
use crate::shared::error::AppError;

const RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// Spawn the relay task. It reconnects after a delay whenever the pub/sub
/// connection drops, and runs until the runtime shuts down.
pub fn spawn_relay(client: Client, gateway: Arc<Gateway>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match relay(&client, &gateway).await {
                Ok(()) => tracing::warn!("Redis pub/sub stream ended, reconnecting"),
                Err(e) => tracing::warn!(error = %e, "Redis pub/sub relay failed, reconnecting"),
            }
            tokio::time::sleep(RECONNECT_DELAY).await;
        }
    })
}

async fn relay(client: &Client, gateway: &Gateway) -> Result<(), AppError> {
    let mut pubsub = client.get_async_pubsub().await?;
    pubsub.psubscribe(patterns::ROOMS).await?;
    pubsub.psubscribe(patterns::USERS).await?;
    pubsub.subscribe(LOBBY_SCOPE).await?;
    tracing::info!("Redis pub/sub relay subscribed");

    let mut messages = pubsub.on_message();
    while let Some(message) = messages.next().await {
        let channel = message.get_channel_name();
        let Some(scope) = EventScope::parse(channel) else {
            tracing::debug!(channel = %channel, "Ignoring message on unknown channel");
            continue;
        };

        match message.get_payload::<String>() {
            Ok(payload) => {
                gateway.deliver(&scope, Arc::from(payload));
            }
            Err(e) => tracing::warn!(channel = %channel, error = %e, "Undecodable pub/sub payload"),
        }
    }

    Ok(())
}
