//! Room Handlers
//!
//! Room lifecycle and membership endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::application::dto::request::{CreateRoomRequest, KickRequest, UpdateNoticeRequest};
use crate::application::dto::response::{JoinResponse, LeaveResponse};
use crate::application::services::{CreateRoomDto, ParticipantDto, RoomDetailDto, RoomSummaryDto};
use crate::domain::Room;
use crate::presentation::http::extractors::{parse_room_id, Identity};
use crate::shared::error::AppError;
use crate::shared::validation::validate_request;
use crate::startup::AppState;

/// Create a room; the caller becomes its creator and first member
pub async fn create_room(
    State(state): State<AppState>,
    identity: Identity,
    Json(body): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<Room>), AppError> {
    validate_request(&body)?;

    let room = state
        .chat
        .create_room(CreateRoomDto {
            title: body.title,
            subject: body.subject,
            creator: identity.username,
            creator_nickname: identity.nickname,
            meeting_date: body.meeting_date,
            max_participants: body.max_participants,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(room)))
}

/// List every room with the caller's unread count
pub async fn list_rooms(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<Vec<RoomSummaryDto>>, AppError> {
    let rooms = state.chat.list_rooms_for_viewer(&identity.username).await?;
    Ok(Json(rooms))
}

pub async fn get_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomDetailDto>, AppError> {
    let room_id = parse_room_id(&room_id)?;
    let detail = state.chat.get_room_detail(room_id).await?;
    Ok(Json(detail))
}

/// Delete a room (creator only)
pub async fn delete_room(
    State(state): State<AppState>,
    identity: Identity,
    Path(room_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let room_id = parse_room_id(&room_id)?;
    state
        .chat
        .delete_room_by_creator(room_id, &identity.username)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Join a room. 201 on a new membership, 200 when already a member.
pub async fn join_room(
    State(state): State<AppState>,
    identity: Identity,
    Path(room_id): Path<String>,
) -> Result<(StatusCode, Json<JoinResponse>), AppError> {
    let room_id = parse_room_id(&room_id)?;
    let joined = state
        .chat
        .join_room(room_id, &identity.username, &identity.nickname)
        .await?;

    let status = if joined {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(JoinResponse { room_id, joined })))
}

pub async fn leave_room(
    State(state): State<AppState>,
    identity: Identity,
    Path(room_id): Path<String>,
) -> Result<Json<LeaveResponse>, AppError> {
    let room_id = parse_room_id(&room_id)?;
    let outcome = state.chat.leave_room(room_id, &identity.username).await?;
    Ok(Json(LeaveResponse { room_id, outcome }))
}

/// Members other than the caller (creator only)
pub async fn get_participants(
    State(state): State<AppState>,
    identity: Identity,
    Path(room_id): Path<String>,
) -> Result<Json<Vec<ParticipantDto>>, AppError> {
    let room_id = parse_room_id(&room_id)?;
    let participants = state
        .chat
        .get_participants(room_id, &identity.username)
        .await?;
    Ok(Json(participants))
}

/// Kick a member and ban them from rejoining (creator only)
pub async fn kick_member(
    State(state): State<AppState>,
    identity: Identity,
    Path(room_id): Path<String>,
    Json(body): Json<KickRequest>,
) -> Result<StatusCode, AppError> {
    validate_request(&body)?;
    let room_id = parse_room_id(&room_id)?;

    state
        .chat
        .kick_and_ban(room_id, &identity.username, &body.username)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Replace the room notice (creator only)
pub async fn update_notice(
    State(state): State<AppState>,
    identity: Identity,
    Path(room_id): Path<String>,
    Json(body): Json<UpdateNoticeRequest>,
) -> Result<Json<Room>, AppError> {
    validate_request(&body)?;
    let room_id = parse_room_id(&room_id)?;

    let room = state
        .chat
        .update_notice(room_id, &identity.username, body.notice)
        .await?;
    Ok(Json(room))
}
