//! # Room Chat
//!
//! Entry point of the room chat server. Initializes:
//! - Tracing/logging subsystem
//! - Configuration loading
//! - The selected store and event backends
//! - HTTP/WebSocket server

use anyhow::Result;
use tracing::info;

use room_chat::config::Settings;
use room_chat::startup::Application;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber for structured logging
    room_chat::telemetry::init_tracing();

    info!("Starting room chat server...");

    // Load configuration from environment and config files
    let settings = Settings::load()?;
    info!(
        host = %settings.server.host,
        port = %settings.server.port,
        environment = %settings.environment,
        storage = ?settings.storage.backend,
        events = ?settings.events.backend,
        "Configuration loaded"
    );

    // Build and run the application
    let application = Application::build(settings).await?;

    info!("Server ready to accept connections");
    application.run_until_stopped().await?;

    Ok(())
}
