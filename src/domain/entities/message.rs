//! Message entity and repository trait.
//!
//! Maps to the `messages` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::PageRequest;
use crate::shared::error::AppError;

/// Message types matching the `messages.message_type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageType {
    /// A user entered the room
    Enter,
    /// Regular text
    #[default]
    Talk,
    /// A user left the room
    Leave,
    /// Body is an image reference
    Image,
}

impl MessageType {
    /// Convert from database string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "ENTER" => Some(Self::Enter),
            "TALK" => Some(Self::Talk),
            "LEAVE" => Some(Self::Leave),
            "IMAGE" => Some(Self::Image),
            _ => None,
        }
    }

    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enter => "ENTER",
            Self::Talk => "TALK",
            Self::Leave => "LEAVE",
            Self::Image => "IMAGE",
        }
    }

    /// ENTER and LEAVE announce a change in who is present.
    pub fn changes_membership(&self) -> bool {
        matches!(self, Self::Enter | Self::Leave)
    }
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An immutable chat message.
///
/// Maps to the `messages` table:
/// - room_id: BIGINT NOT NULL (composite PK)
/// - seq: BIGINT NOT NULL (composite PK), 1-based and gapless per room
/// - sender / sender_nickname: VARCHAR NOT NULL
/// - body: TEXT NOT NULL
/// - message_type: VARCHAR(8) NOT NULL
/// - created_at: TIMESTAMPTZ NOT NULL
///
/// Ordering within a room is by `seq` only; `timestamp` is informational.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub room_id: i64,

    pub seq: i64,

    pub sender: String,

    pub sender_nickname: String,

    pub body: String,

    #[serde(rename = "type")]
    pub message_type: MessageType,

    pub timestamp: DateTime<Utc>,
}

/// Fields supplied when appending; `seq` and `timestamp` are assigned by the log.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub room_id: i64,
    pub sender: String,
    pub sender_nickname: String,
    pub body: String,
    pub message_type: MessageType,
}

/// Repository trait for the append-only message log.
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Append a message.
    ///
    /// Obtains `seq` from the room's `increment_and_fetch_seq` first, then
    /// writes the row. A seq obtained for a write that later fails is never
    /// handed out again.
    async fn append(&self, message: NewMessage) -> Result<Message, AppError>;

    /// One page of a room's messages, newest first (descending `seq`).
    async fn find_page(&self, room_id: i64, page: PageRequest) -> Result<Vec<Message>, AppError>;

    /// Number of messages stored for a room.
    async fn count_by_room(&self, room_id: i64) -> Result<i64, AppError>;

    /// Remove a room's whole log. Only used by room teardown.
    async fn delete_all_by_room(&self, room_id: i64) -> Result<(), AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_type_round_trip() {
        for ty in [
            MessageType::Enter,
            MessageType::Talk,
            MessageType::Leave,
            MessageType::Image,
        ] {
            assert_eq!(MessageType::parse(ty.as_str()), Some(ty));
        }
        assert_eq!(MessageType::parse("talk"), Some(MessageType::Talk));
        assert_eq!(MessageType::parse("SHOUT"), None);
    }

    #[test]
    fn test_membership_types() {
        assert!(MessageType::Enter.changes_membership());
        assert!(MessageType::Leave.changes_membership());
        assert!(!MessageType::Talk.changes_membership());
        assert!(!MessageType::Image.changes_membership());
    }

    #[test]
    fn test_wire_shape() {
        let message = Message {
            room_id: 1,
            seq: 3,
            sender: "alice".into(),
            sender_nickname: "Alice".into(),
            body: "hi".into(),
            message_type: MessageType::Talk,
            timestamp: Utc::now(),
        };

        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["type"], "TALK");
        assert_eq!(json["roomId"], 1);
        assert_eq!(json["senderNickname"], "Alice");
    }
}
