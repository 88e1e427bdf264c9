//! Infrastructure Layer
//!
//! Contains implementations for external services including:
//! - Database repositories (PostgreSQL)
//! - In-memory repositories (tests, single-process deployments)
//! - Redis pub/sub event distribution
//! - Prometheus metrics

pub mod database;
pub mod memory;
pub mod metrics;
pub mod pubsub;
pub mod repositories;
mod stores;

pub use stores::ChatStores;
