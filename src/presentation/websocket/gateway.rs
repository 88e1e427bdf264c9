//! WebSocket Gateway
//!
//! Manages connected sessions and routes events to them by scope.
//!
//! Every session is subscribed to its own `user:{name}` scope and to
//! `lobby` when it registers; room scopes are added on request. Each
//! session owns a bounded outbound queue, and a full queue drops frames
//! rather than stalling the publisher.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use serde::Deserialize;
use tokio::sync::mpsc::{self, error::TrySendError};

use super::messages::event_frame;
use crate::domain::{ChatEvent, EventPublisher, EventScope};
use crate::shared::error::AppError;

/// Outbound frame, already serialized; shared between every recipient.
pub type Frame = Arc<str>;

/// Connected session with its outbound queue
pub struct ConnectedSession {
    pub session_id: String,
    pub username: String,
    sender: mpsc::Sender<Frame>,
    scopes: Mutex<HashSet<EventScope>>,
}

/// WebSocket gateway managing all connections
pub struct Gateway {
    /// Active sessions by session_id
    sessions: DashMap<String, Arc<ConnectedSession>>,
    /// Scope to subscribed session ids
    subscriptions: DashMap<EventScope, HashSet<String>>,
    channel_capacity: usize,
}

impl Gateway {
    pub fn new(channel_capacity: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            subscriptions: DashMap::new(),
            channel_capacity: channel_capacity.max(1),
        }
    }

    /// Register a session and subscribe it to its user scope and the lobby.
    /// Returns the receiving end of the session's outbound queue.
    pub fn register_session(&self, session_id: &str, username: &str) -> mpsc::Receiver<Frame> {
        let (sender, receiver) = mpsc::channel(self.channel_capacity);
        let session = Arc::new(ConnectedSession {
            session_id: session_id.to_string(),
            username: username.to_string(),
            sender,
            scopes: Mutex::new(HashSet::new()),
        });
        self.sessions.insert(session_id.to_string(), session);

        self.subscribe(session_id, EventScope::user(username));
        self.subscribe(session_id, EventScope::Lobby);

        tracing::info!(session_id = %session_id, username = %username, "Session registered");
        receiver
    }

    /// Unregister a session and drop all of its subscriptions
    pub fn unregister_session(&self, session_id: &str) {
        let Some((_, session)) = self.sessions.remove(session_id) else {
            return;
        };

        let scopes: Vec<EventScope> = session.scopes.lock().drain().collect();
        for scope in scopes {
            self.remove_subscriber(&scope, session_id);
        }

        tracing::info!(
            session_id = %session_id,
            username = %session.username,
            "Session unregistered"
        );
    }

    /// Add a scope subscription to a session. Unknown sessions are ignored.
    pub fn subscribe(&self, session_id: &str, scope: EventScope) -> bool {
        let Some(session) = self.session(session_id) else {
            return false;
        };
        session.scopes.lock().insert(scope.clone());
        self.subscriptions
            .entry(scope)
            .or_default()
            .insert(session_id.to_string());
        true
    }

    /// Remove a scope subscription from a session
    pub fn unsubscribe(&self, session_id: &str, scope: &EventScope) {
        if let Some(session) = self.session(session_id) {
            session.scopes.lock().remove(scope);
        }
        self.remove_subscriber(scope, session_id);
    }

    pub fn is_subscribed(&self, session_id: &str, scope: &EventScope) -> bool {
        self.subscriptions
            .get(scope)
            .map(|ids| ids.contains(session_id))
            .unwrap_or(false)
    }

    /// Send a serialized event to every session subscribed to `scope`.
    /// Returns the number of sessions the frame was queued for.
    pub fn deliver(&self, scope: &EventScope, payload: Frame) -> usize {
        let recipients = self.subscribers(scope);
        let mut delivered = 0;

        if !recipients.is_empty() {
            let frame: Frame = Arc::from(event_frame(scope, &payload));
            for session_id in &recipients {
                if self.send_to_session(session_id, frame.clone()) {
                    delivered += 1;
                }
            }
        }

        if let EventScope::Room(room_id) = scope {
            if let Some(kicked) = kicked_username(&payload) {
                self.drop_room_for_user(*room_id, &kicked);
            }
        }

        delivered
    }

    /// Queue a frame for one session without waiting.
    pub fn send_to_session(&self, session_id: &str, frame: Frame) -> bool {
        let Some(session) = self.session(session_id) else {
            return false;
        };
        match session.sender.try_send(frame) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                tracing::warn!(session_id = %session_id, "Outbound queue full, dropping frame");
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }

    /// Get session count
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    fn session(&self, session_id: &str) -> Option<Arc<ConnectedSession>> {
        self.sessions.get(session_id).map(|s| Arc::clone(s.value()))
    }

    fn subscribers(&self, scope: &EventScope) -> Vec<String> {
        self.subscriptions
            .get(scope)
            .map(|ids| ids.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn remove_subscriber(&self, scope: &EventScope, session_id: &str) {
        if let Some(mut ids) = self.subscriptions.get_mut(scope) {
            ids.remove(session_id);
        }
        self.subscriptions.remove_if(scope, |_, ids| ids.is_empty());
    }

    /// A kicked user stops receiving the room on every one of their sessions.
    fn drop_room_for_user(&self, room_id: i64, username: &str) {
        let room = EventScope::room(room_id);
        for session_id in self.subscribers(&EventScope::user(username)) {
            self.unsubscribe(&session_id, &room);
            tracing::debug!(session_id = %session_id, room_id, "Room subscription dropped after kick");
        }
    }
}

/// The kicked username, if `payload` is a serialized KICK event.
fn kicked_username(payload: &str) -> Option<String> {
    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Kick {
        #[serde(rename = "type")]
        event_type: String,
        kicked_username: String,
    }

    if !payload.contains("\"KICK\"") {
        return None;
    }
    serde_json::from_str::<Kick>(payload)
        .ok()
        .filter(|kick| kick.event_type == "KICK")
        .map(|kick| kick.kicked_username)
}

#[async_trait]
impl EventPublisher for Gateway {
    async fn publish(&self, scope: &EventScope, event: &ChatEvent) -> Result<(), AppError> {
        let payload: Frame = Arc::from(serde_json::to_string(event)?);
        let delivered = self.deliver(scope, payload);
        tracing::trace!(
            scope = %scope,
            event_type = event.event_name(),
            delivered = delivered,
            "Event delivered locally"
        );
        Ok(())
    }
}
