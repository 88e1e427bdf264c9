//! Request DTOs
//!
//! Data structures for API request bodies and query strings.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::Validate;

use crate::domain::{MessageType, PageRequest};

/// Create room request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    #[validate(length(min = 1, max = 100, message = "Title must be 1-100 characters"))]
    pub title: String,

    #[serde(default)]
    #[validate(length(max = 255, message = "Subject must be at most 255 characters"))]
    pub subject: String,

    pub meeting_date: DateTime<Utc>,

    #[validate(range(min = 1, message = "maxParticipants must be at least 1"))]
    pub max_participants: i32,
}

/// Send message request
#[derive(Debug, Deserialize, Validate)]
pub struct SendMessageRequest {
    #[serde(default)]
    #[validate(length(max = 2000, message = "Message must be at most 2000 characters"))]
    pub body: String,

    #[serde(rename = "type", default)]
    pub message_type: MessageType,
}

/// Kick-and-ban request
#[derive(Debug, Deserialize, Validate)]
pub struct KickRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
}

/// Update notice request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateNoticeRequest {
    #[validate(length(max = 500, message = "Notice must be at most 500 characters"))]
    pub notice: String,
}

/// Update read cursor request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReadCursorRequest {
    #[validate(range(min = 0, message = "lastReadMessageSeq cannot be negative"))]
    pub last_read_message_seq: i64,
}

/// Message history query parameters
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl PageQuery {
    /// A missing size is left as 0 so the service applies its default.
    pub fn into_page(self) -> PageRequest {
        PageRequest::new(self.page.unwrap_or(0), self.size.unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::validation::validate_request;
    use serde_json::json;

    #[test]
    fn test_create_room_request_camel_case() {
        let request: CreateRoomRequest = serde_json::from_value(json!({
            "title": "Book club",
            "meetingDate": "2026-03-01T18:00:00Z",
            "maxParticipants": 8
        }))
        .unwrap();

        assert_eq!(request.subject, "");
        assert_eq!(request.max_participants, 8);
        assert!(validate_request(&request).is_ok());
    }

    #[test]
    fn test_send_message_defaults_to_talk() {
        let request: SendMessageRequest = serde_json::from_value(json!({"body": "hi"})).unwrap();
        assert_eq!(request.message_type, MessageType::Talk);

        let image: SendMessageRequest =
            serde_json::from_value(json!({"body": "cat.png", "type": "IMAGE"})).unwrap();
        assert_eq!(image.message_type, MessageType::Image);
    }

    #[test]
    fn test_negative_cursor_is_invalid() {
        let request = UpdateReadCursorRequest {
            last_read_message_seq: -1,
        };
        assert!(validate_request(&request).is_err());
    }

    #[test]
    fn test_page_query_defaults() {
        assert_eq!(PageQuery::default().into_page(), PageRequest::new(0, 0));
    }
}
