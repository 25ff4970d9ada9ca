// src/core/errors.rs

//! Defines the error types shared across the server.

use std::sync::Arc;
use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Failures that stop the server from starting or break a single transport.
///
/// Business failures never take this path: they travel inside the `err` field
/// of a response envelope (see [`crate::core::protocol::ApiError`]).
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("IO Error: {0}")]
    Io(Arc<std::io::Error>),

    #[error("Failed to bind listener on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: Arc<std::io::Error>,
    },

    #[error("Database Error: {0}")]
    Database(#[from] StoreError),

    #[error("WebSocket Error: {0}")]
    WebSocket(Arc<tungstenite::Error>),

    #[error("Dispatcher is no longer running")]
    DispatcherClosed,

    #[error("Internal Server Error: {0}")]
    Internal(String),
}

// `std::io::Error` and `tungstenite::Error` are not cloneable, hence the `Arc`s.
impl Clone for ServerError {
    fn clone(&self) -> Self {
        match self {
            ServerError::Io(e) => ServerError::Io(Arc::clone(e)),
            ServerError::Bind { addr, source } => ServerError::Bind {
                addr: addr.clone(),
                source: Arc::clone(source),
            },
            ServerError::Database(e) => ServerError::Database(e.clone()),
            ServerError::WebSocket(e) => ServerError::WebSocket(Arc::clone(e)),
            ServerError::DispatcherClosed => ServerError::DispatcherClosed,
            ServerError::Internal(s) => ServerError::Internal(s.clone()),
        }
    }
}

impl From<std::io::Error> for ServerError {
    fn from(e: std::io::Error) -> Self {
        ServerError::Io(Arc::new(e))
    }
}

impl From<tungstenite::Error> for ServerError {
    fn from(e: tungstenite::Error) -> Self {
        ServerError::WebSocket(Arc::new(e))
    }
}

/// Failures reported by a [`crate::core::storage::DataStore`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Failed to open database '{name}': {reason}")]
    Open { name: String, reason: String },

    #[error("Malformed database '{name}': {reason}")]
    Parse { name: String, reason: String },

    #[error("Invalid credentials for user '{0}'")]
    Credentials(String),

    #[error("Database is not connected")]
    NotConnected,

    #[error("Database unavailable: {0}")]
    Unavailable(String),
}

impl ServerError {
    /// Returns true for errors caused by the peer simply going away.
    pub fn is_normal_disconnect(&self) -> bool {
        match self {
            ServerError::Io(e) => is_disconnect_kind(e.kind()),
            ServerError::WebSocket(e) => match e.as_ref() {
                tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed => true,
                tungstenite::Error::Protocol(
                    tungstenite::error::ProtocolError::ResetWithoutClosingHandshake,
                ) => true,
                tungstenite::Error::Io(io) => is_disconnect_kind(io.kind()),
                _ => false,
            },
            _ => false,
        }
    }
}

fn is_disconnect_kind(kind: std::io::ErrorKind) -> bool {
    matches!(
        kind,
        std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::BrokenPipe
            | std::io::ErrorKind::UnexpectedEof
            | std::io::ErrorKind::ConnectionAborted
    )
}
