//! Read status entity and repository trait.
//!
//! Maps to the `read_status` table. A row exists exactly while the user is a
//! member of the room, so this table doubles as the membership list.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// A user's read cursor in one room.
///
/// Maps to the `read_status` table:
/// - room_id: BIGINT NOT NULL (composite PK)
/// - username: VARCHAR NOT NULL (composite PK)
/// - nickname: VARCHAR NOT NULL
/// - last_read_message_seq: BIGINT NOT NULL DEFAULT 0
/// - last_read_at: TIMESTAMPTZ NOT NULL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadStatus {
    pub room_id: i64,

    pub username: String,

    /// Display name captured when the user joined
    pub nickname: String,

    pub last_read_message_seq: i64,

    pub last_read_at: DateTime<Utc>,
}

impl ReadStatus {
    /// A fresh membership with nothing read yet.
    pub fn new(room_id: i64, username: impl Into<String>, nickname: impl Into<String>) -> Self {
        Self {
            room_id,
            username: username.into(),
            nickname: nickname.into(),
            last_read_message_seq: 0,
            last_read_at: Utc::now(),
        }
    }

    /// Messages not yet read out of `total_messages`, never negative.
    pub fn unread_of(&self, total_messages: i64) -> i64 {
        unread_count(total_messages, self.last_read_message_seq)
    }
}

/// `max(0, total - cursor)`.
pub fn unread_count(total_messages: i64, cursor: i64) -> i64 {
    (total_messages - cursor).max(0)
}

/// Repository trait for ReadStatus data access operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReadStatusRepository: Send + Sync {
    async fn find(&self, room_id: i64, username: &str) -> Result<Option<ReadStatus>, AppError>;

    async fn exists(&self, room_id: i64, username: &str) -> Result<bool, AppError>;

    /// Insert or replace the row for `(room_id, username)`.
    async fn save(&self, status: &ReadStatus) -> Result<(), AppError>;

    /// Delete one row. Returns whether a row was removed.
    async fn delete(&self, room_id: i64, username: &str) -> Result<bool, AppError>;

    /// Number of members of a room.
    async fn count_by_room(&self, room_id: i64) -> Result<i64, AppError>;

    async fn find_by_room(&self, room_id: i64) -> Result<Vec<ReadStatus>, AppError>;

    async fn find_by_user(&self, username: &str) -> Result<Vec<ReadStatus>, AppError>;

    /// Create the row with cursor `seq` if absent, otherwise set the cursor
    /// to `seq` and refresh `last_read_at`. Does not enforce monotonicity.
    async fn upsert_read_cursor(&self, room_id: i64, username: &str, seq: i64)
        -> Result<(), AppError>;

    /// Remove every row of a room. Only used by room teardown.
    async fn delete_all_by_room(&self, room_id: i64) -> Result<(), AppError>;
}
