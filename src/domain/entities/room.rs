//! Room entity and repository trait.
//!
//! Maps to the `rooms` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// A named chat room.
///
/// Maps to the `rooms` table:
/// - id: BIGINT PRIMARY KEY (allocated from the `roomId` sequence)
/// - title: VARCHAR(100) NOT NULL
/// - subject: VARCHAR(255) NOT NULL
/// - creator / creator_nickname: VARCHAR NOT NULL
/// - meeting_date: TIMESTAMPTZ NOT NULL
/// - max_participants: INTEGER NOT NULL CHECK (max_participants > 0)
/// - notice: TEXT NOT NULL DEFAULT ''
/// - last_message_seq: BIGINT NOT NULL DEFAULT 0
/// - banned_usernames: TEXT[] NOT NULL DEFAULT '{}'
/// - created_at / updated_at: TIMESTAMPTZ NOT NULL
///
/// Membership is not stored here; it is the set of `read_status` rows
/// with this room's id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: i64,

    pub title: String,

    pub subject: String,

    /// Username of the creator. Ownership never transfers.
    pub creator: String,

    pub creator_nickname: String,

    pub meeting_date: DateTime<Utc>,

    /// Capacity, always > 0
    pub max_participants: i32,

    /// Creator-editable announcement, empty by default
    pub notice: String,

    /// Sequence number of the most recent message, 0 when none exist
    pub last_message_seq: i64,

    /// Usernames barred from joining. Only ever grows.
    pub banned_usernames: Vec<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Room {
    /// Check if `username` created this room.
    pub fn is_creator(&self, username: &str) -> bool {
        self.creator == username
    }

    /// Check if `username` has been banned from this room.
    pub fn is_banned(&self, username: &str) -> bool {
        self.banned_usernames.iter().any(|b| b == username)
    }

    /// Check whether a room holding `member_count` members has room for one more.
    pub fn has_capacity_for(&self, member_count: i64) -> bool {
        member_count < i64::from(self.max_participants)
    }
}

/// Fields supplied when a room is created; the store fills in the rest.
#[derive(Debug, Clone)]
pub struct NewRoom {
    pub title: String,
    pub subject: String,
    pub creator: String,
    pub creator_nickname: String,
    pub meeting_date: DateTime<Utc>,
    pub max_participants: i32,
}

/// Repository trait for Room data access operations.
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Persist a new room. The id comes from the `roomId` sequence,
    /// `last_message_seq` starts at 0 and the notice is empty.
    async fn create(&self, room: NewRoom) -> Result<Room, AppError>;

    /// Find a room by id.
    async fn find_by_id(&self, id: i64) -> Result<Option<Room>, AppError>;

    /// List every room, oldest first.
    async fn find_all(&self) -> Result<Vec<Room>, AppError>;

    /// Overwrite the mutable fields (title, subject, notice, updated_at).
    ///
    /// Never touches `last_message_seq` or `banned_usernames`; those have
    /// their own atomic operations.
    async fn save(&self, room: &Room) -> Result<(), AppError>;

    /// Delete a room record. Deleting a missing room is not an error.
    async fn delete(&self, id: i64) -> Result<(), AppError>;

    /// Atomically bump `last_message_seq` and return the new value.
    ///
    /// Returns `AppError::NotFound` if the room does not exist.
    async fn increment_and_fetch_seq(&self, id: i64) -> Result<i64, AppError>;

    /// Atomically add `username` to the ban set.
    ///
    /// Returns `true` when the name was newly added, `false` when it was
    /// already present. Returns `AppError::NotFound` for a missing room.
    async fn add_banned_username(&self, id: i64, username: &str) -> Result<bool, AppError>;
}
