// src/server/context.rs

use super::dispatch_loop::SessionEvent;
use crate::config::Config;
use crate::core::errors::ServerError;
use crate::core::handler::Dispatcher;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::sync::{Semaphore, broadcast};
use tokio::task::JoinSet;

/// The dispatcher and its event queue, waiting to be spawned.
pub struct DispatchInit {
    pub dispatcher: Dispatcher,
    pub events_rx: UnboundedReceiver<SessionEvent>,
}

/// Holds all the initialized state required to run the server's main loop.
pub struct ServerContext {
    pub config: Arc<Config>,
    pub listener: TcpListener,
    pub events_tx: UnboundedSender<SessionEvent>,
    pub dispatch_init: Option<DispatchInit>,
    pub shutdown_tx: broadcast::Sender<()>,
    /// Subscribed at setup so a shutdown sent before the loop starts is not lost.
    pub shutdown_rx: broadcast::Receiver<()>,
    pub background_tasks: JoinSet<Result<(), ServerError>>,
    pub connection_permits: Arc<Semaphore>,
}
