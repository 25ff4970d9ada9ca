// src/connection/mod.rs

//! Manages the lifecycle of a single client WebSocket connection: reading
//! text frames, handing them to the dispatch loop, and writing replies.

mod guard;
mod handler;
mod session;

pub use guard::ConnectionGuard;
pub use handler::ConnectionHandler;
pub use session::SessionInfo;
