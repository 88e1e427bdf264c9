//! Application Services
//!
//! Business logic services that coordinate domain operations.
//!
//! ## Available Services
//!
//! - **ChatService**: Rooms, membership, messages, read cursors and the
//!   events they produce

pub mod chat_service;

pub use chat_service::{
    ChatError, ChatService, ChatServiceImpl, CreateRoomDto, LeaveOutcome, ParticipantDto,
    RoomDetailDto, RoomSummaryDto, SendMessageDto,
};
