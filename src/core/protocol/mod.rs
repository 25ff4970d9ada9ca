// src/core/protocol/mod.rs

//! The JSON envelope protocol spoken over WebSocket text frames.

pub mod envelope;

pub use envelope::{ApiError, Record, Request, Response, UNKNOWN_CMD, UNKNOWN_CMD_JSON};
