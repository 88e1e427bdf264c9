//! # Domain Layer
//!
//! The domain layer contains the core business types of the chat engine.
//! It is independent of any external frameworks or infrastructure concerns.
//!
//! ## Structure
//!
//! - **entities**: Room, Message, ReadStatus and their store traits
//! - **value_objects**: EventScope, PageRequest
//! - **events**: the closed set of real-time events and the publisher seam
//!
//! ## Design Principles
//!
//! - No dependencies on infrastructure or presentation layers
//! - Repository traits define data access contracts
//! - Membership is derived from read status rows, never stored twice

pub mod entities;
pub mod events;
pub mod value_objects;

// Re-export commonly used types
pub use entities::*;
pub use events::{ChatEvent, EventPublisher};
pub use value_objects::*;
