//! # Room Chat Library
//!
//! A multi-room persistent group chat backend:
//! - Rooms with a capacity, a creator, a notice and a ban list
//! - Gapless per-room message sequence numbers
//! - Per-user read cursors that double as room membership
//! - Real-time fan-out to room, user and lobby scopes
//!
//! ## Architecture
//!
//! The crate follows Clean Architecture principles:
//!
//! - **Domain Layer**: Entities, store traits, the event union
//! - **Application Layer**: The chat service orchestrator and DTOs
//! - **Infrastructure Layer**: PostgreSQL and in-memory stores, Redis pub/sub, metrics
//! - **Presentation Layer**: HTTP handlers and WebSocket gateway
//!
//! ## Module Structure
//!
//! ```text
//! room_chat/
//! +-- config/         Configuration management
//! +-- domain/         Entities, value objects, events and traits
//! +-- application/    Chat service and DTOs
//! +-- infrastructure/ Store, pub/sub and metrics implementations
//! +-- presentation/   HTTP routes and WebSocket handlers
//! +-- shared/         Errors and validation helpers
//! ```

// Configuration module
pub mod config;

// Domain layer - Core business logic
pub mod domain;

// Application layer - Business services
pub mod application;

// Infrastructure layer - External implementations
pub mod infrastructure;

// Presentation layer - HTTP and WebSocket handlers
pub mod presentation;

// Shared utilities
pub mod shared;

// Application startup and state management
pub mod startup;

// Telemetry and observability
pub mod telemetry;
