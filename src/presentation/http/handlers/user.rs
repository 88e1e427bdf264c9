//! User Handlers
//!
//! Endpoints scoped to the calling user.

use axum::{extract::State, Json};

use crate::application::dto::response::{RoomIdsResponse, TotalUnreadResponse};
use crate::presentation::http::extractors::Identity;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Ids of every room the caller belongs to
pub async fn get_my_rooms(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<RoomIdsResponse>, AppError> {
    let room_ids = state.chat.get_my_room_ids(&identity.username).await?;
    Ok(Json(RoomIdsResponse { room_ids }))
}

/// Unread messages summed over every joined room
pub async fn get_my_unread(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<TotalUnreadResponse>, AppError> {
    let total_unread_count = state.chat.get_total_unread_count(&identity.username).await?;
    Ok(Json(TotalUnreadResponse { total_unread_count }))
}
