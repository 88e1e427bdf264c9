//! Store bundle handed to the chat service.

use std::sync::Arc;

use sqlx::PgPool;

use super::memory::{
    MemoryMessageRepository, MemoryReadStatusRepository, MemoryRoomRepository,
    MemorySequenceRepository,
};
use super::repositories::{PgMessageRepository, PgReadStatusRepository, PgRoomRepository};
use crate::domain::{MessageRepository, ReadStatusRepository, RoomRepository};

/// The three stores the chat service composes, behind trait objects so the
/// backend is picked at startup.
#[derive(Clone)]
pub struct ChatStores {
    pub rooms: Arc<dyn RoomRepository>,
    pub messages: Arc<dyn MessageRepository>,
    pub read_status: Arc<dyn ReadStatusRepository>,
}

impl ChatStores {
    /// PostgreSQL-backed stores sharing one pool.
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            rooms: Arc::new(PgRoomRepository::new(pool.clone())),
            messages: Arc::new(PgMessageRepository::new(pool.clone())),
            read_status: Arc::new(PgReadStatusRepository::new(pool)),
        }
    }

    /// Process-local stores. The message log shares the room store so seq
    /// allocation goes through the same watermark.
    pub fn memory() -> Self {
        let rooms: Arc<dyn RoomRepository> = Arc::new(MemoryRoomRepository::new(Arc::new(
            MemorySequenceRepository::new(),
        )));
        Self {
            messages: Arc::new(MemoryMessageRepository::new(rooms.clone())),
            read_status: Arc::new(MemoryReadStatusRepository::new()),
            rooms,
        }
    }
}
