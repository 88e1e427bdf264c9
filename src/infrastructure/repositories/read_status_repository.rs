//! Read Status Repository Implementation
//!
//! PostgreSQL implementation of per-user read cursors. The rows of a room
//! are its member list.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{ReadStatus, ReadStatusRepository};
use crate::shared::error::AppError;

pub struct PgReadStatusRepository {
    pool: PgPool,
}

impl PgReadStatusRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ReadStatusRow {
    room_id: i64,
    username: String,
    nickname: String,
    last_read_message_seq: i64,
    last_read_at: DateTime<Utc>,
}

impl From<ReadStatusRow> for ReadStatus {
    fn from(row: ReadStatusRow) -> Self {
        ReadStatus {
            room_id: row.room_id,
            username: row.username,
            nickname: row.nickname,
            last_read_message_seq: row.last_read_message_seq,
            last_read_at: row.last_read_at,
        }
    }
}

#[async_trait]
impl ReadStatusRepository for PgReadStatusRepository {
    async fn find(&self, room_id: i64, username: &str) -> Result<Option<ReadStatus>, AppError> {
        let row = sqlx::query_as::<_, ReadStatusRow>(
            r#"
            SELECT room_id, username, nickname, last_read_message_seq, last_read_at
            FROM read_status
            WHERE room_id = $1 AND username = $2
            "#,
        )
        .bind(room_id)
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ReadStatus::from))
    }

    async fn exists(&self, room_id: i64, username: &str) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM read_status WHERE room_id = $1 AND username = $2)",
        )
        .bind(room_id)
        .bind(username)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn save(&self, status: &ReadStatus) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO read_status (room_id, username, nickname, last_read_message_seq, last_read_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (room_id, username) DO UPDATE
            SET nickname = EXCLUDED.nickname,
                last_read_message_seq = EXCLUDED.last_read_message_seq,
                last_read_at = EXCLUDED.last_read_at
            "#,
        )
        .bind(status.room_id)
        .bind(&status.username)
        .bind(&status.nickname)
        .bind(status.last_read_message_seq)
        .bind(status.last_read_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, room_id: i64, username: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM read_status WHERE room_id = $1 AND username = $2")
            .bind(room_id)
            .bind(username)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_by_room(&self, room_id: i64) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM read_status WHERE room_id = $1")
            .bind(room_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn find_by_room(&self, room_id: i64) -> Result<Vec<ReadStatus>, AppError> {
        let rows = sqlx::query_as::<_, ReadStatusRow>(
            r#"
            SELECT room_id, username, nickname, last_read_message_seq, last_read_at
            FROM read_status
            WHERE room_id = $1
            ORDER BY username ASC
            "#,
        )
        .bind(room_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ReadStatus::from).collect())
    }

    async fn find_by_user(&self, username: &str) -> Result<Vec<ReadStatus>, AppError> {
        let rows = sqlx::query_as::<_, ReadStatusRow>(
            r#"
            SELECT room_id, username, nickname, last_read_message_seq, last_read_at
            FROM read_status
            WHERE username = $1
            ORDER BY room_id ASC
            "#,
        )
        .bind(username)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ReadStatus::from).collect())
    }

    async fn upsert_read_cursor(
        &self,
        room_id: i64,
        username: &str,
        seq: i64,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO read_status (room_id, username, nickname, last_read_message_seq, last_read_at)
            VALUES ($1, $2, $2, $3, NOW())
            ON CONFLICT (room_id, username) DO UPDATE
            SET last_read_message_seq = EXCLUDED.last_read_message_seq,
                last_read_at = NOW()
            "#,
        )
        .bind(room_id)
        .bind(username)
        .bind(seq)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_all_by_room(&self, room_id: i64) -> Result<(), AppError> {
        sqlx::query("DELETE FROM read_status WHERE room_id = $1")
            .bind(room_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
