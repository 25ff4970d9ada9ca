// src/core/commands/command_trait.rs

//! Defines the trait implemented by every command handler.

use crate::core::protocol::{Request, Response};
use crate::core::storage::DataStore;
use async_trait::async_trait;

/// A handler bound to one command name in the registry.
#[async_trait]
pub trait CommandHandler: Send + Sync + 'static {
    /// The `cmd` value this handler answers.
    fn name(&self) -> &'static str;

    /// Fulfils one request. Must not fail outside the returned envelope.
    async fn execute(&self, request: &Request, store: &dyn DataStore) -> Response;
}
