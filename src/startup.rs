//! Application Startup
//!
//! Application building and server initialization.

use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::application::services::{ChatService, ChatServiceImpl};
use crate::config::{EventBackend, Settings, StorageBackend};
use crate::domain::EventPublisher;
use crate::infrastructure::pubsub::{self, RedisEventPublisher};
use crate::infrastructure::{database, ChatStores};
use crate::presentation::http::{handlers::health, routes};
use crate::presentation::middleware::{create_cors_layer, create_trace_layer};
use crate::presentation::websocket::Gateway;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub chat: Arc<dyn ChatService>,
    pub gateway: Arc<Gateway>,
    pub settings: Arc<Settings>,
    /// Present when rooms live in PostgreSQL
    pub db: Option<PgPool>,
    /// Present when events travel over Redis
    pub redis: Option<RedisEventPublisher>,
}

impl AppState {
    /// State over in-memory stores with local event delivery.
    pub fn in_memory(settings: Settings) -> Self {
        let gateway = Arc::new(Gateway::new(settings.events.channel_capacity));
        let chat = Arc::new(ChatServiceImpl::new(
            ChatStores::memory(),
            gateway.clone(),
            settings.chat.clone(),
        ));

        Self {
            chat,
            gateway,
            settings: Arc::new(settings),
            db: None,
            redis: None,
        }
    }
}

/// Router with every route and the cross-cutting layers applied.
pub fn build_router(state: AppState) -> Router {
    let cors = create_cors_layer(&state.settings.cors);
    routes::create_router(state)
        .layer(create_trace_layer())
        .layer(cors)
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
    relay: Option<JoinHandle<()>>,
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self> {
        health::init_server_start();

        let (stores, db) = match settings.storage.backend {
            StorageBackend::Postgres => {
                let pool = database::create_pool(&settings.database).await?;
                tracing::info!("Database connection pool created");
                database::run_migrations(&pool).await?;
                tracing::info!("Database migrations applied");
                (ChatStores::postgres(pool.clone()), Some(pool))
            }
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory stores; nothing survives a restart");
                (ChatStores::memory(), None)
            }
        };

        // Create WebSocket gateway
        let gateway = Arc::new(Gateway::new(settings.events.channel_capacity));

        let mut redis = None;
        let mut relay = None;
        let publisher: Arc<dyn EventPublisher> = match settings.events.backend {
            EventBackend::Local => gateway.clone(),
            EventBackend::Redis => {
                let (client, manager) = pubsub::create_redis_client(&settings.redis).await?;
                relay = Some(pubsub::spawn_relay(client, gateway.clone()));
                let publisher = RedisEventPublisher::new(manager);
                redis = Some(publisher.clone());
                Arc::new(publisher)
            }
        };

        let chat = Arc::new(ChatServiceImpl::new(
            stores,
            publisher,
            settings.chat.clone(),
        ));

        // Bind to address
        let addr = settings.server_addr();
        let listener = TcpListener::bind(&addr).await?;
        tracing::info!("Listening on {}", addr);

        let state = AppState {
            chat,
            gateway,
            settings: Arc::new(settings),
            db,
            redis,
        };

        Ok(Self {
            listener,
            router: build_router(state),
            relay,
        })
    }

    /// Run the server until stopped
    pub async fn run_until_stopped(self) -> Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        if let Some(relay) = self.relay {
            relay.abort();
        }
        Ok(())
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
