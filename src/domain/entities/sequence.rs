//! Named durable counters.
//!
//! Maps to the `sequences` table (`name` VARCHAR PRIMARY KEY, `value` BIGINT).

use async_trait::async_trait;

use crate::shared::error::AppError;

/// Counter used for room id allocation.
pub const ROOM_ID_SEQUENCE: &str = "roomId";

/// Atomic increment-and-fetch over a named counter.
///
/// N concurrent calls with the same name return N distinct consecutive
/// values. A missing counter is created at 0 before the first increment,
/// so the first value handed out is 1.
#[async_trait]
pub trait SequenceRepository: Send + Sync {
    async fn next_value(&self, name: &str) -> Result<i64, AppError>;
}
