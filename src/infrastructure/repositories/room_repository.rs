//! Room Repository Implementation
//!
//! PostgreSQL implementation of room operations. The message watermark and
//! the ban list are only ever changed by single-statement updates so
//! concurrent senders and kicks cannot lose each other's writes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::PgSequenceRepository;
use crate::domain::{NewRoom, Room, RoomRepository, SequenceRepository, ROOM_ID_SEQUENCE};
use crate::shared::error::AppError;

#[derive(Clone)]
pub struct PgRoomRepository {
    pool: PgPool,
    sequences: PgSequenceRepository,
}

impl PgRoomRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            sequences: PgSequenceRepository::new(pool.clone()),
            pool,
        }
    }

    async fn exists(&self, id: i64) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM rooms WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }
}

/// Internal row type for room queries.
#[derive(Debug, sqlx::FromRow)]
struct RoomRow {
    id: i64,
    title: String,
    subject: String,
    creator: String,
    creator_nickname: String,
    meeting_date: DateTime<Utc>,
    max_participants: i32,
    notice: String,
    last_message_seq: i64,
    banned_usernames: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<RoomRow> for Room {
    fn from(row: RoomRow) -> Self {
        Room {
            id: row.id,
            title: row.title,
            subject: row.subject,
            creator: row.creator,
            creator_nickname: row.creator_nickname,
            meeting_date: row.meeting_date,
            max_participants: row.max_participants,
            notice: row.notice,
            last_message_seq: row.last_message_seq,
            banned_usernames: row.banned_usernames,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const ROOM_COLUMNS: &str = "id, title, subject, creator, creator_nickname, meeting_date, \
     max_participants, notice, last_message_seq, banned_usernames, created_at, updated_at";

#[async_trait]
impl RoomRepository for PgRoomRepository {
    async fn create(&self, room: NewRoom) -> Result<Room, AppError> {
        let id = self.sequences.next_value(ROOM_ID_SEQUENCE).await?;

        let row = sqlx::query_as::<_, RoomRow>(&format!(
            r#"
            INSERT INTO rooms (id, title, subject, creator, creator_nickname, meeting_date,
                               max_participants, notice, last_message_seq, banned_usernames,
                               created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, '', 0, '{{}}', NOW(), NOW())
            RETURNING {ROOM_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&room.title)
        .bind(&room.subject)
        .bind(&room.creator)
        .bind(&room.creator_nickname)
        .bind(room.meeting_date)
        .bind(room.max_participants)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Room>, AppError> {
        let row = sqlx::query_as::<_, RoomRow>(&format!(
            "SELECT {ROOM_COLUMNS} FROM rooms WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Room::from))
    }

    async fn find_all(&self) -> Result<Vec<Room>, AppError> {
        let rows = sqlx::query_as::<_, RoomRow>(&format!(
            "SELECT {ROOM_COLUMNS} FROM rooms ORDER BY id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Room::from).collect())
    }

    async fn save(&self, room: &Room) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE rooms
            SET title = $2, subject = $3, notice = $4, updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(room.id)
        .bind(&room.title)
        .bind(&room.subject)
        .bind(&room.notice)
        .bind(room.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Room {} not found", room.id)));
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        sqlx::query("DELETE FROM rooms WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn increment_and_fetch_seq(&self, id: i64) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE rooms
            SET last_message_seq = last_message_seq + 1
            WHERE id = $1
            RETURNING last_message_seq
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Room {} not found", id)))
    }

    async fn add_banned_username(&self, id: i64, username: &str) -> Result<bool, AppError> {
        let added = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE rooms
            SET banned_usernames = array_append(banned_usernames, $2), updated_at = NOW()
            WHERE id = $1 AND NOT ($2 = ANY(banned_usernames))
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        if added.is_some() {
            return Ok(true);
        }
        if self.exists(id).await? {
            Ok(false)
        } else {
            Err(AppError::NotFound(format!("Room {} not found", id)))
        }
    }
}
