//! WebSocket Session State

use std::time::Instant;

/// Per-connection state owned by the connection task
#[derive(Debug)]
pub struct SessionState {
    pub session_id: String,
    pub username: String,
    pub nickname: String,
    pub connected_at: Instant,
    pub frames_received: u64,
}

impl SessionState {
    pub fn new(session_id: String, username: String, nickname: String) -> Self {
        Self {
            session_id,
            username,
            nickname,
            connected_at: Instant::now(),
            frames_received: 0,
        }
    }

    pub fn record_frame(&mut self) -> u64 {
        self.frames_received += 1;
        self.frames_received
    }
}
