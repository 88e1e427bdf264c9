//! Message Repository Implementation
//!
//! PostgreSQL implementation of the append-only message log with offset
//! pagination over descending sequence numbers.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::PgRoomRepository;
use crate::domain::{Message, MessageRepository, MessageType, NewMessage, PageRequest, RoomRepository};
use crate::shared::error::AppError;

/// PostgreSQL message repository implementation.
///
/// Sequence numbers come from the owning room's watermark, so the room row
/// stays authoritative for how many messages a room has seen.
pub struct PgMessageRepository {
    pool: PgPool,
    rooms: PgRoomRepository,
}

impl PgMessageRepository {
    /// Creates a new PgMessageRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            rooms: PgRoomRepository::new(pool.clone()),
            pool,
        }
    }
}

/// Internal row type for message queries.
#[derive(Debug, sqlx::FromRow)]
struct MessageRow {
    room_id: i64,
    seq: i64,
    sender: String,
    sender_nickname: String,
    body: String,
    message_type: String,
    created_at: DateTime<Utc>,
}

impl MessageRow {
    /// Converts database row to domain Message entity.
    fn into_message(self) -> Result<Message, AppError> {
        let message_type = MessageType::parse(&self.message_type).ok_or_else(|| {
            AppError::Internal(format!("Unknown message type {:?}", self.message_type))
        })?;

        Ok(Message {
            room_id: self.room_id,
            seq: self.seq,
            sender: self.sender,
            sender_nickname: self.sender_nickname,
            body: self.body,
            message_type,
            timestamp: self.created_at,
        })
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    async fn append(&self, message: NewMessage) -> Result<Message, AppError> {
        // The seq is consumed even if the insert below fails.
        let seq = self.rooms.increment_and_fetch_seq(message.room_id).await?;

        let row = sqlx::query_as::<_, MessageRow>(
            r#"
            INSERT INTO messages (room_id, seq, sender, sender_nickname, body, message_type, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW())
            RETURNING room_id, seq, sender, sender_nickname, body, message_type, created_at
            "#,
        )
        .bind(message.room_id)
        .bind(seq)
        .bind(&message.sender)
        .bind(&message.sender_nickname)
        .bind(&message.body)
        .bind(message.message_type.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            // The room was deleted after the seq was allocated
            sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
                AppError::NotFound(format!("Room {} not found", message.room_id))
            }
            e => AppError::Database(e),
        })?;

        row.into_message()
    }

    async fn find_page(&self, room_id: i64, page: PageRequest) -> Result<Vec<Message>, AppError> {
        let rows = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT room_id, seq, sender, sender_nickname, body, message_type, created_at
            FROM messages
            WHERE room_id = $1
            ORDER BY seq DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(room_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(MessageRow::into_message).collect()
    }

    async fn count_by_room(&self, room_id: i64) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM messages WHERE room_id = $1")
            .bind(room_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn delete_all_by_room(&self, room_id: i64) -> Result<(), AppError> {
        sqlx::query("DELETE FROM messages WHERE room_id = $1")
            .bind(room_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
