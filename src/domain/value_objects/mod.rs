//! # Domain Value Objects
//!
//! Immutable value types that represent domain concepts without identity.
//!
//! ## Value Objects
//!
//! - **EventScope**: room / user / lobby fan-out address
//! - **PageRequest**: offset page over a newest-first message listing

mod event_scope;
mod page;

pub use event_scope::*;
pub use page::*;
