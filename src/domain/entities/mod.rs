//! # Domain Entities
//!
//! Core domain entities of the chat engine. All entities map directly to
//! their corresponding database tables.
//!
//! - **Room**: chat room metadata, capacity, ban list, notice and the
//!   per-room message sequence watermark
//! - **Message**: an immutable entry of a room's append-only log
//! - **ReadStatus**: a user's read cursor in a room, and the sole record of
//!   that user's membership
//! - **Sequence**: named durable counters (room ids)
//!
//! ## Repository Traits
//!
//! Each entity has an associated repository trait defining data access operations.
//! These traits are implemented in the infrastructure layer, following the
//! dependency inversion principle.

mod message;
mod read_status;
mod room;
mod sequence;

pub use message::{Message, MessageRepository, MessageType, NewMessage};
pub use read_status::{unread_count, ReadStatus, ReadStatusRepository};
#[cfg(test)]
pub use read_status::MockReadStatusRepository;
pub use room::{NewRoom, Room, RoomRepository};
pub use sequence::{SequenceRepository, ROOM_ID_SEQUENCE};
