//! Message Handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::application::dto::request::{PageQuery, SendMessageRequest, UpdateReadCursorRequest};
use crate::application::dto::response::UnreadResponse;
use crate::application::services::SendMessageDto;
use crate::domain::Message;
use crate::presentation::http::extractors::{parse_room_id, Identity};
use crate::shared::error::AppError;
use crate::shared::validation::validate_request;
use crate::startup::AppState;

/// Get one page of history, oldest first within the page
pub async fn get_messages(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<Message>>, AppError> {
    let room_id = parse_room_id(&room_id)?;
    let messages = state
        .chat
        .get_previous_messages(room_id, query.into_page())
        .await?;
    Ok(Json(messages))
}

/// Send message to room
pub async fn send_message(
    State(state): State<AppState>,
    identity: Identity,
    Path(room_id): Path<String>,
    Json(body): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<Message>), AppError> {
    validate_request(&body)?;
    let room_id = parse_room_id(&room_id)?;

    let message = state
        .chat
        .send_message(SendMessageDto {
            room_id,
            sender: identity.username,
            sender_nickname: identity.nickname,
            body: body.body,
            message_type: body.message_type,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(message)))
}

/// Move the caller's read cursor. 204 when the caller is not a member.
pub async fn update_read_status(
    State(state): State<AppState>,
    identity: Identity,
    Path(room_id): Path<String>,
    Json(body): Json<UpdateReadCursorRequest>,
) -> Result<Response, AppError> {
    validate_request(&body)?;
    let room_id = parse_room_id(&room_id)?;

    let unread = state
        .chat
        .update_read_cursor(room_id, &identity.username, body.last_read_message_seq)
        .await?;

    Ok(match unread {
        Some(unread_count) => Json(UnreadResponse {
            room_id,
            unread_count,
        })
        .into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}
