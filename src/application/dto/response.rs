//! Response DTOs
//!
//! Data structures for API response bodies. Rooms, messages and room
//! summaries serialize directly; these cover the remaining shapes.

use serde::Serialize;

use crate::application::services::LeaveOutcome;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinResponse {
    pub room_id: i64,
    /// `false` when the caller already was a member
    pub joined: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveResponse {
    pub room_id: i64,
    pub outcome: LeaveOutcome,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreadResponse {
    pub room_id: i64,
    pub unread_count: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomIdsResponse {
    pub room_ids: Vec<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalUnreadResponse {
    pub total_unread_count: i64,
}
