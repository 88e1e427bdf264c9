//! Pub/Sub Module
//!
//! Redis connection management and cross-instance event distribution.
//!
//! ```text
//! ChatService --publish--> RedisEventPublisher --PUBLISH room:1--> Redis
//!                                                                    |
//!   Gateway <--deliver-- relay task <--PSUBSCRIBE room:* user:*------+
//! ```
//!
//! Every instance runs one relay task, so a message sent through any
//! instance reaches the sessions connected to all of them.

mod publisher;
mod relay;

pub use publisher::RedisEventPublisher;
pub use relay::spawn_relay;

use redis::aio::ConnectionManager;
use redis::Client;
use tracing::{info, instrument};

use crate::config::RedisSettings;

/// Channel patterns the relay listens on.
pub mod patterns {
    /// Every room-scoped channel
    pub const ROOMS: &str = "room:*";
    /// Every user-scoped channel
    pub const USERS: &str = "user:*";
}

/// Creates a Redis connection manager with automatic reconnection.
///
/// # Arguments
/// * `settings` - Redis configuration settings
///
/// # Returns
/// * `Ok((Client, ConnectionManager))` - The client (for pub/sub
///   connections) and a managed connection for commands
/// * `Err(redis::RedisError)` - If connection fails
#[instrument(skip(settings), fields(url = %settings.url))]
pub async fn create_redis_client(
    settings: &RedisSettings,
) -> Result<(Client, ConnectionManager), redis::RedisError> {
    info!("Connecting to Redis...");
    let client = Client::open(settings.url.as_str())?;
    let manager = ConnectionManager::new(client.clone()).await?;
    info!("Redis connection established");
    Ok((client, manager))
}
