//! WebSocket Message Types
//!
//! Gateway frames are JSON objects tagged by `op` with the payload in `d`.
//!
//! ```text
//! client -> server   SUBSCRIBE {roomId}   UNSUBSCRIBE {roomId}
//!                    SEND {roomId, body, type}   READ {roomId, seq}   PING
//! server -> client   HELLO {sessionId, username}   EVENT {scope, event}
//!                    ERROR {message}   PONG
//! ```

use serde::{Deserialize, Serialize};

use crate::domain::{EventScope, MessageType};

/// Incoming gateway frame
#[derive(Debug, PartialEq, Deserialize)]
#[serde(tag = "op", content = "d", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GatewayReceive {
    Subscribe(RoomPayload),
    Unsubscribe(RoomPayload),
    Send(SendPayload),
    Read(ReadPayload),
    Ping,
}

#[derive(Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomPayload {
    pub room_id: i64,
}

#[derive(Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendPayload {
    pub room_id: i64,
    #[serde(default)]
    pub body: String,
    #[serde(rename = "type", default)]
    pub message_type: MessageType,
}

#[derive(Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadPayload {
    pub room_id: i64,
    pub seq: i64,
}

/// Outgoing gateway frame. EVENT frames are assembled by [`event_frame`]
/// so one serialized event is shared by every recipient.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "op", content = "d", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GatewaySend {
    Hello(HelloPayload),
    Error(ErrorPayload),
    Pong,
}

impl GatewaySend {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(ErrorPayload {
            message: message.into(),
        })
    }

    pub fn to_text(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Hello payload, sent once after the upgrade
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HelloPayload {
    pub session_id: String,
    pub username: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorPayload {
    pub message: String,
}

/// `{"op":"EVENT","d":{"scope":..,"event":..}}` around an already
/// serialized event.
pub fn event_frame(scope: &EventScope, payload: &str) -> String {
    format!(
        r#"{{"op":"EVENT","d":{{"scope":{},"event":{}}}}}"#,
        serde_json::Value::String(scope.name()),
        payload
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    #[test]
    fn test_parse_client_frames() {
        let send: GatewayReceive =
            serde_json::from_str(r#"{"op":"SEND","d":{"roomId":4,"body":"hi"}}"#).unwrap();
        let ping: GatewayReceive = serde_json::from_str(r#"{"op":"PING"}"#).unwrap();

        assert_eq!(
            send,
            GatewayReceive::Send(SendPayload {
                room_id: 4,
                body: "hi".into(),
                message_type: MessageType::Talk,
            })
        );
        assert_eq!(ping, GatewayReceive::Ping);
        assert!(serde_json::from_str::<GatewayReceive>(r#"{"op":"IDENTIFY"}"#).is_err());
    }

    #[test]
    fn test_server_frames() {
        let hello = GatewaySend::Hello(HelloPayload {
            session_id: "abc".into(),
            username: "alice".into(),
        });

        assert_eq!(
            serde_json::to_value(&hello).unwrap(),
            json!({"op": "HELLO", "d": {"sessionId": "abc", "username": "alice"}})
        );
        assert_eq!(
            serde_json::to_value(GatewaySend::Pong).unwrap(),
            json!({"op": "PONG"})
        );
    }

    #[test]
    fn test_event_frame_is_valid_json() {
        let frame = event_frame(&EventScope::user("민\"b"), r#"{"type":"ROOMS_CHANGED"}"#);
        let value: Value = serde_json::from_str(&frame).unwrap();

        assert_eq!(value["op"], "EVENT");
        assert_eq!(value["d"]["scope"], "user:민\"b");
        assert_eq!(value["d"]["event"]["type"], "ROOMS_CHANGED");
    }
}
