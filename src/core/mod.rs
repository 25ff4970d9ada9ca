// src/core/mod.rs

//! The central module containing the protocol, command handling and the
//! persistence collaborator.

pub mod commands;
pub mod errors;
pub mod handler;
pub mod metrics;
pub mod protocol;
pub mod storage;

pub use errors::{ServerError, StoreError};
pub use handler::{CommandRegistry, Dispatcher};
pub use protocol::{ApiError, Request, Response};
