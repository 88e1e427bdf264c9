//! WebSocket Gateway
//!
//! Real-time event delivery and chat actions over WebSocket connections.

pub mod gateway;
pub mod handler;
pub mod messages;
pub mod session;

pub use gateway::{Frame, Gateway};
pub use handler::ws_handler;
pub use messages::{GatewayReceive, GatewaySend};
pub use session::SessionState;
