//! WebSocket Connection Handler
//!
//! One task per connection: the identity comes from the upgrade query
//! string, events arrive through the gateway queue, and client frames are
//! turned into chat service calls.

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use uuid::Uuid;

use super::gateway::Frame;
use super::messages::{GatewayReceive, GatewaySend, HelloPayload};
use super::session::SessionState;
use crate::application::services::SendMessageDto;
use crate::domain::EventScope;
use crate::infrastructure::metrics;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Upgrade query parameters
#[derive(Debug, Deserialize)]
pub struct ConnectParams {
    #[serde(default)]
    pub username: String,
    pub nickname: Option<String>,
}

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(params): Query<ConnectParams>,
) -> Result<Response, AppError> {
    let username = params.username.trim().to_string();
    if username.is_empty() {
        return Err(AppError::Unauthorized("username is required".into()));
    }
    let nickname = params
        .nickname
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| username.clone());

    Ok(ws
        .max_message_size(state.settings.websocket.max_message_size)
        .on_upgrade(move |socket| handle_socket(socket, state, username, nickname)))
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState, username: String, nickname: String) {
    let session_id = Uuid::new_v4().to_string();
    let mut session = SessionState::new(session_id.clone(), username, nickname);

    // Split socket for concurrent read/write
    let (mut sender, mut receiver) = socket.split();

    let mut outbound = state
        .gateway
        .register_session(&session_id, &session.username);
    metrics::set_websocket_connections(state.gateway.session_count());

    // Spawn task to forward queued frames to the socket
    let sender_task = tokio::spawn(async move {
        while let Some(frame) = outbound.recv().await {
            if sender.send(Message::Text(frame.as_ref().into())).await.is_err() {
                break;
            }
        }
    });

    reply(
        &state,
        &session_id,
        &GatewaySend::Hello(HelloPayload {
            session_id: session_id.clone(),
            username: session.username.clone(),
        }),
    );

    tracing::info!(
        session_id = %session_id,
        username = %session.username,
        "WebSocket connected"
    );

    // Main message loop
    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                session.record_frame();
                if let Err(e) = handle_message(text.as_str(), &session, &state).await {
                    tracing::debug!(session_id = %session_id, error = %e, "Frame rejected");
                    reply(&state, &session_id, &GatewaySend::error(e.to_string()));
                }
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(session_id = %session_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    // Cleanup
    state.gateway.unregister_session(&session_id);
    metrics::set_websocket_connections(state.gateway.session_count());
    sender_task.abort();

    tracing::info!(
        session_id = %session_id,
        username = %session.username,
        frames = session.frames_received,
        connected_secs = session.connected_at.elapsed().as_secs(),
        "WebSocket disconnected"
    );
}

/// Handle one client frame
async fn handle_message(text: &str, session: &SessionState, state: &AppState) -> Result<(), AppError> {
    let frame: GatewayReceive = serde_json::from_str(text)
        .map_err(|e| AppError::BadRequest(format!("Invalid frame: {e}")))?;

    match frame {
        GatewayReceive::Subscribe(room) => {
            if !state.chat.is_member(room.room_id, &session.username).await? {
                return Err(AppError::Forbidden("Not a member of this room".into()));
            }
            state
                .gateway
                .subscribe(&session.session_id, EventScope::room(room.room_id));
            tracing::debug!(session_id = %session.session_id, room_id = room.room_id, "Subscribed");
        }

        GatewayReceive::Unsubscribe(room) => {
            state
                .gateway
                .unsubscribe(&session.session_id, &EventScope::room(room.room_id));
        }

        GatewayReceive::Send(send) => {
            state
                .chat
                .send_message(SendMessageDto {
                    room_id: send.room_id,
                    sender: session.username.clone(),
                    sender_nickname: session.nickname.clone(),
                    body: send.body,
                    message_type: send.message_type,
                })
                .await?;
        }

        GatewayReceive::Read(read) => {
            state
                .chat
                .update_read_cursor(read.room_id, &session.username, read.seq)
                .await?;
        }

        GatewayReceive::Ping => reply(state, &session.session_id, &GatewaySend::Pong),
    }

    Ok(())
}

fn reply(state: &AppState, session_id: &str, message: &GatewaySend) {
    match message.to_text() {
        Ok(text) => {
            state
                .gateway
                .send_to_session(session_id, Frame::from(text));
        }
        Err(e) => tracing::error!(error = %e, "Failed to serialize gateway frame"),
    }
}
