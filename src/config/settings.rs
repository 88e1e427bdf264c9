//! Application settings and configuration structures.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Root configuration structure containing all application settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Server configuration (host, port)
    pub server: ServerSettings,

    /// Database configuration (PostgreSQL)
    pub database: DatabaseSettings,

    /// Redis configuration
    pub redis: RedisSettings,

    /// Which store backend holds rooms, messages and read status
    pub storage: StorageSettings,

    /// Event fan-out backend
    pub events: EventSettings,

    /// Chat engine behavior
    pub chat: ChatSettings,

    /// CORS configuration
    pub cors: CorsSettings,

    /// WebSocket configuration
    pub websocket: WebSocketSettings,

    /// Current environment (development, staging, production)
    pub environment: String,
}

/// Server binding configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// Host address to bind to (e.g., "0.0.0.0")
    pub host: String,

    /// Port number to listen on
    pub port: u16,
}

/// PostgreSQL database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// Database connection URL
    #[serde(default)]
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections to maintain
    pub min_connections: u32,

    /// Connection acquire timeout in seconds
    pub acquire_timeout: u64,
}

/// Redis configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RedisSettings {
    /// Redis connection URL
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    pub backend: StorageBackend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventBackend {
    /// Deliver straight into this process's websocket gateway
    Local,
    /// Publish through Redis pub/sub so every instance sees every event
    Redis,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventSettings {
    pub backend: EventBackend,

    /// Per-session outbound queue capacity before frames are dropped
    pub channel_capacity: usize,
}

/// Chat engine configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatSettings {
    /// Upper bound for every store call made by the chat service
    pub store_timeout_ms: u64,

    /// Hold a per-room lock around join/leave/kick within this process
    pub serialize_membership: bool,

    /// Ignore read cursor updates that would move the cursor backwards
    pub monotonic_read_cursor: bool,

    /// Maximum message body length in characters
    pub max_message_length: usize,

    /// Largest capacity a room may be created with
    pub max_participants_limit: i32,

    pub default_page_size: u32,
    pub max_page_size: u32,
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CorsSettings {
    /// Allowed origins (comma-separated in env)
    pub allowed_origins: Vec<String>,
}

/// WebSocket configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WebSocketSettings {
    /// Maximum inbound frame size in bytes (default: 64KB)
    pub max_message_size: usize,
}

impl Settings {
    /// Load settings from environment variables and configuration files.
    ///
    /// The loading order is:
    /// 1. config/default.toml (base configuration)
    /// 2. config/{RUN_ENV}.toml (environment-specific overrides)
    /// 3. Environment variables (highest priority)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if configuration cannot be loaded or parsed,
    /// or if a selected backend is missing its connection URL.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        // Determine the running environment
        let environment = std::env::var("RUN_ENV").unwrap_or_else(|_| "development".into());

        Self::defaults(Config::builder(), &environment)?
            // Load from config files
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // APP__SERVER__PORT=3000 -> server.port = 3000
            .add_source(
                Environment::default()
                    .prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            // Map simple environment variables
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option("server.port", std::env::var("SERVER_PORT").ok())?
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .set_override_option("redis.url", std::env::var("REDIS_URL").ok())?
            .build()?
            .try_deserialize()
            .and_then(Self::validate)
    }

    /// Settings built from defaults alone, with the in-memory store and local
    /// fan-out. Used by tests and single-process demos.
    pub fn in_memory() -> Result<Self, ConfigError> {
        Self::defaults(Config::builder(), "test")?
            .set_override("storage.backend", "memory")?
            .set_override("events.backend", "local")?
            .build()?
            .try_deserialize()
            .and_then(Self::validate)
    }

    fn defaults(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
        environment: &str,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        builder
            .set_default("environment", environment)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("database.url", "")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("database.acquire_timeout", 30)?
            .set_default("redis.url", "")?
            .set_default("storage.backend", "postgres")?
            .set_default("events.backend", "local")?
            .set_default("events.channel_capacity", 1024_i64)?
            .set_default("chat.store_timeout_ms", 5000_i64)?
            .set_default("chat.serialize_membership", true)?
            .set_default("chat.monotonic_read_cursor", false)?
            .set_default("chat.max_message_length", 2000_i64)?
            .set_default("chat.max_participants_limit", 100_i64)?
            .set_default("chat.default_page_size", 30_i64)?
            .set_default("chat.max_page_size", 100_i64)?
            .set_default("cors.allowed_origins", vec!["http://localhost:3000"])?
            .set_default("websocket.max_message_size", 65536_i64)
    }

    fn validate(settings: Self) -> Result<Self, ConfigError> {
        if settings.storage.backend == StorageBackend::Postgres && settings.database.url.is_empty() {
            return Err(ConfigError::Message(
                "database.url (or DATABASE_URL) is required for the postgres storage backend".into(),
            ));
        }
        if settings.events.backend == EventBackend::Redis && settings.redis.url.is_empty() {
            return Err(ConfigError::Message(
                "redis.url (or REDIS_URL) is required for the redis event backend".into(),
            ));
        }
        if settings.chat.max_page_size == 0 || settings.chat.default_page_size == 0 {
            return Err(ConfigError::Message("page sizes must be positive".into()));
        }
        Ok(settings)
    }

    /// Get the full server address as a string.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_defaults() {
        let settings = Settings::in_memory().unwrap();

        assert_eq!(settings.storage.backend, StorageBackend::Memory);
        assert_eq!(settings.events.backend, EventBackend::Local);
        assert_eq!(settings.chat.store_timeout_ms, 5000);
        assert!(settings.chat.serialize_membership);
        assert!(!settings.chat.monotonic_read_cursor);
        assert_eq!(settings.server_addr(), "0.0.0.0:3000");
    }

    #[test]
    fn test_postgres_backend_requires_url() {
        let result = Settings::defaults(Config::builder(), "test")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize::<Settings>()
            .and_then(Settings::validate);

        assert!(matches!(result, Err(ConfigError::Message(_))));
    }
}
