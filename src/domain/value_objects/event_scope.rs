//! Addressable fan-out scopes.
//!
//! ```text
//! room:{room_id}    every session subscribed to a room
//! user:{username}   every session of one user
//! lobby             every connected session
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix for room-scoped channels
pub const ROOM_SCOPE_PREFIX: &str = "room:";
/// Prefix for user-scoped channels
pub const USER_SCOPE_PREFIX: &str = "user:";
/// The broadcast channel
pub const LOBBY_SCOPE: &str = "lobby";

/// Where an event is delivered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EventScope {
    Room(i64),
    User(String),
    Lobby,
}

impl EventScope {
    pub fn room(room_id: i64) -> Self {
        Self::Room(room_id)
    }

    pub fn user(username: impl Into<String>) -> Self {
        Self::User(username.into())
    }

    /// Channel name used on the wire and in Redis.
    pub fn name(&self) -> String {
        match self {
            Self::Room(id) => format!("{ROOM_SCOPE_PREFIX}{id}"),
            Self::User(name) => format!("{USER_SCOPE_PREFIX}{name}"),
            Self::Lobby => LOBBY_SCOPE.to_string(),
        }
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Room(_) => "room",
            Self::User(_) => "user",
            Self::Lobby => "lobby",
        }
    }

    /// Parse a channel name back into a scope.
    pub fn parse(name: &str) -> Option<Self> {
        if name == LOBBY_SCOPE {
            return Some(Self::Lobby);
        }
        if let Some(id) = name.strip_prefix(ROOM_SCOPE_PREFIX) {
            return id.parse().ok().map(Self::Room);
        }
        name.strip_prefix(USER_SCOPE_PREFIX)
            .filter(|user| !user.is_empty())
            .map(|user| Self::User(user.to_string()))
    }
}

impl fmt::Display for EventScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl TryFrom<String> for EventScope {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("invalid event scope: {value}"))
    }
}

impl From<EventScope> for String {
    fn from(scope: EventScope) -> Self {
        scope.name()
    }
}
