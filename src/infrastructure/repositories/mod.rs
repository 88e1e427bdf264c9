//! Repository Implementations
//!
//! PostgreSQL implementations of domain repository traits.
//!
//! ## Available Repositories
//!
//! - **PgSequenceRepository** - Named atomic counters (room ids)
//! - **PgRoomRepository** - Rooms, message watermark, ban list
//! - **PgMessageRepository** - Append-only message log with offset paging
//! - **PgReadStatusRepository** - Read cursors, which are also membership
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use sqlx::PgPool;
//! use room_chat::infrastructure::repositories::{
//!     PgMessageRepository, PgReadStatusRepository, PgRoomRepository,
//! };
//!
//! async fn setup_repositories(pool: PgPool) {
//!     let room_repo = PgRoomRepository::new(pool.clone());
//!     let message_repo = PgMessageRepository::new(pool.clone());
//!     let read_status_repo = PgReadStatusRepository::new(pool);
//! }
//! ```

pub mod message_repository;
pub mod read_status_repository;
pub mod room_repository;
pub mod sequence_repository;

pub use message_repository::PgMessageRepository;
pub use read_status_repository::PgReadStatusRepository;
pub use room_repository::PgRoomRepository;
pub use sequence_repository::PgSequenceRepository;
