// src/connection/session.rs

//! Defines the bookkeeping kept for one open session.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

/// What the dispatch loop knows about an open session.
///
/// Requests are authorized by their own fields, so nothing here influences
/// how a command is handled.
#[derive(Debug, Clone)]
pub struct SessionInfo {
    pub session_id: u64,
    pub addr: SocketAddr,
    pub created: Instant,
    pub last_command_time: Instant,
    /// Frames answered on this session so far.
    pub requests: u64,
}

impl SessionInfo {
    pub fn new(session_id: u64, addr: SocketAddr) -> Self {
        let now = Instant::now();
        Self {
            session_id,
            addr,
            created: now,
            last_command_time: now,
            requests: 0,
        }
    }

    /// Time since the session opened.
    pub fn lifetime(&self) -> Duration {
        self.created.elapsed()
    }

    /// Time since the last answered request, or since opening if none.
    pub fn idle(&self) -> Duration {
        self.last_command_time.elapsed()
    }

    /// Records one answered request.
    pub fn touch(&mut self) {
        self.last_command_time = Instant::now();
        self.requests = self.requests.wrapping_add(1);
    }
}
