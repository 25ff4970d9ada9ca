// src/core/handler/dispatcher.rs

//! Turns one raw text frame into one serialized response envelope.
//!
//! The algorithm is fixed: parse the frame as a JSON object, read `cmd`, look
//! the name up in the [`CommandRegistry`], run the bound handler. Any step that
//! does not produce a response yields the `unknown_cmd` envelope. Nothing a
//! handler does, panics included, escapes as an error.

use super::registry::CommandRegistry;
use crate::core::metrics;
use crate::core::protocol::{ApiError, Request, Response};
use crate::core::storage::DataStore;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tracing::{Instrument, debug, error, info_span};

/// Routes request envelopes to their handlers.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<CommandRegistry>,
    store: Arc<dyn DataStore>,
}

impl Dispatcher {
    pub fn new(registry: Arc<CommandRegistry>, store: Arc<dyn DataStore>) -> Self {
        Self { registry, store }
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Dispatches `raw` and returns the serialized response.
    pub async fn dispatch(&self, raw: &str) -> String {
        self.dispatch_envelope(raw).await.to_json()
    }

    /// Dispatches `raw` and returns the response before serialization.
    pub async fn dispatch_envelope(&self, raw: &str) -> Response {
        let Some(request) = Request::parse(raw) else {
            debug!("Frame is not a JSON object; answering unknown_cmd.");
            metrics::UNKNOWN_COMMANDS_TOTAL.inc();
            return Response::unknown_cmd();
        };

        let Some(handler) = self.registry.get(request.cmd()) else {
            debug!("No handler bound to '{}'; answering unknown_cmd.", request.cmd());
            metrics::UNKNOWN_COMMANDS_TOTAL.inc();
            return Response::unknown_cmd();
        };

        let name = handler.name();
        let span = info_span!("command", name = %name);
        let start_time = Instant::now();

        let outcome = AssertUnwindSafe(handler.execute(&request, self.store.as_ref()))
            .catch_unwind()
            .instrument(span)
            .await;

        metrics::COMMANDS_PROCESSED_TOTAL
            .with_label_values(&[name])
            .inc();
        metrics::COMMAND_LATENCY_SECONDS.observe(start_time.elapsed().as_secs_f64());

        match outcome {
            Ok(response) => response,
            Err(_) => {
                error!("Handler for '{}' panicked; isolating the failure.", name);
                Response::failure(name, ApiError::Internal)
            }
        }
    }
}
