//! Real-time events published by the chat service.
//!
//! Events are a closed set. On the wire a message event is the message
//! object itself (its `type` is ENTER/TALK/LEAVE/IMAGE); every other event
//! is an object with a `type` discriminator and camelCase fields.

use async_trait::async_trait;
use serde::{Serialize, Serializer};

use super::entities::Message;
use super::value_objects::EventScope;
use crate::shared::error::AppError;

#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    /// A message appended to a room's log
    Message(Message),
    /// Member count of a room changed
    ParticipantsUpdated { room_id: i64, participant_count: i64 },
    /// A user's unread count for one room
    UnreadUpdated { room_id: i64, unread_count: i64 },
    /// A user's unread count summed over every joined room
    TotalUnreadUpdated { total_unread_count: i64 },
    /// A room listed in the lobby saw activity
    LobbyRoomUpdated { room_id: i64 },
    /// Rooms were created or removed, or membership changed
    RoomsChanged,
    /// A member was removed and banned by the creator
    Kicked { room_id: i64, kicked_username: String },
    NoticeUpdated { room_id: i64, notice: String },
}

impl ChatEvent {
    /// Get the event name used in logs and metrics.
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::Message(_) => "MESSAGE",
            Self::ParticipantsUpdated { .. } => "PARTICIPANT_COUNT_UPDATE",
            Self::UnreadUpdated { .. } => "UNREAD_UPDATE",
            Self::TotalUnreadUpdated { .. } => "TOTAL_UNREAD_COUNT_UPDATE",
            Self::LobbyRoomUpdated { .. } => "LOBBY_ROOM_UPDATE",
            Self::RoomsChanged => "ROOMS_CHANGED",
            Self::Kicked { .. } => "KICK",
            Self::NoticeUpdated { .. } => "NOTICE_UPDATE",
        }
    }

    /// Convert to JSON value for sending
    pub fn to_json(&self) -> Result<serde_json::Value, AppError> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Borrowed wire form of every non-message event.
#[derive(Serialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
enum WireEvent<'a> {
    #[serde(rename = "PARTICIPANT_COUNT_UPDATE")]
    ParticipantsUpdated { room_id: i64, participant_count: i64 },
    #[serde(rename = "UNREAD_UPDATE")]
    UnreadUpdated { room_id: i64, unread_count: i64 },
    #[serde(rename = "TOTAL_UNREAD_COUNT_UPDATE")]
    TotalUnreadUpdated { total_unread_count: i64 },
    #[serde(rename = "LOBBY_ROOM_UPDATE")]
    LobbyRoomUpdated { room_id: i64 },
    #[serde(rename = "ROOMS_CHANGED")]
    RoomsChanged {},
    #[serde(rename = "KICK")]
    Kicked { room_id: i64, kicked_username: &'a str },
    #[serde(rename = "NOTICE_UPDATE")]
    NoticeUpdated { room_id: i64, notice: &'a str },
}

impl Serialize for ChatEvent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let wire = match self {
            Self::Message(message) => return message.serialize(serializer),
            Self::ParticipantsUpdated {
                room_id,
                participant_count,
            } => WireEvent::ParticipantsUpdated {
                room_id: *room_id,
                participant_count: *participant_count,
            },
            Self::UnreadUpdated {
                room_id,
                unread_count,
            } => WireEvent::UnreadUpdated {
                room_id: *room_id,
                unread_count: *unread_count,
            },
            Self::TotalUnreadUpdated { total_unread_count } => WireEvent::TotalUnreadUpdated {
                total_unread_count: *total_unread_count,
            },
            Self::LobbyRoomUpdated { room_id } => WireEvent::LobbyRoomUpdated { room_id: *room_id },
            Self::RoomsChanged => WireEvent::RoomsChanged {},
            Self::Kicked {
                room_id,
                kicked_username,
            } => WireEvent::Kicked {
                room_id: *room_id,
                kicked_username,
            },
            Self::NoticeUpdated { room_id, notice } => WireEvent::NoticeUpdated {
                room_id: *room_id,
                notice,
            },
        };
        wire.serialize(serializer)
    }
}

/// Fan-out seam. Delivery is best effort and at most once; callers log and
/// drop failures instead of undoing the mutation that produced the event.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, scope: &EventScope, event: &ChatEvent) -> Result<(), AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MessageType;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_notification_wire_shape() {
        assert_eq!(
            serde_json::to_value(ChatEvent::ParticipantsUpdated {
                room_id: 3,
                participant_count: 2
            })
            .unwrap(),
            json!({"type": "PARTICIPANT_COUNT_UPDATE", "roomId": 3, "participantCount": 2})
        );
        assert_eq!(
            serde_json::to_value(ChatEvent::Kicked {
                room_id: 3,
                kicked_username: "bob".into()
            })
            .unwrap(),
            json!({"type": "KICK", "roomId": 3, "kickedUsername": "bob"})
        );
        assert_eq!(
            serde_json::to_value(ChatEvent::TotalUnreadUpdated {
                total_unread_count: 9
            })
            .unwrap(),
            json!({"type": "TOTAL_UNREAD_COUNT_UPDATE", "totalUnreadCount": 9})
        );
        assert_eq!(
            serde_json::to_value(ChatEvent::RoomsChanged).unwrap(),
            json!({"type": "ROOMS_CHANGED"})
        );
    }

    #[test]
    fn test_message_event_is_the_message() {
        let message = Message {
            room_id: 1,
            seq: 1,
            sender: "alice".into(),
            sender_nickname: "Alice".into(),
            body: "hello".into(),
            message_type: MessageType::Enter,
            timestamp: Utc::now(),
        };

        let value = ChatEvent::Message(message.clone()).to_json().unwrap();
        assert_eq!(value, serde_json::to_value(&message).unwrap());
        assert_eq!(value["type"], "ENTER");
    }
}
