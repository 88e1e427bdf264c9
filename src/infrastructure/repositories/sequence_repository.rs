//! Sequence Repository Implementation
//!
//! Named counters in the `sequences` table. A single upsert statement both
//! creates a missing counter and increments an existing one, so concurrent
//! callers serialize on the row lock and never see the same value.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::SequenceRepository;
use crate::shared::error::AppError;

#[derive(Clone)]
pub struct PgSequenceRepository {
    pool: PgPool,
}

impl PgSequenceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SequenceRepository for PgSequenceRepository {
    async fn next_value(&self, name: &str) -> Result<i64, AppError> {
        let value = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO sequences (name, value)
            VALUES ($1, 1)
            ON CONFLICT (name) DO UPDATE SET value = sequences.value + 1
            RETURNING value
            "#,
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(value)
    }
}
