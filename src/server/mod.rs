// src/server/mod.rs

use crate::config::Config;
use crate::core::errors::ServerError;
use crate::core::storage::DataStore;
use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::{broadcast, oneshot};
use tokio::task::JoinHandle;
use tracing::{error, info};

mod connection_loop;
mod context;
mod dispatch_loop;
mod initialization;
mod metrics_server;
mod spawner;

pub use dispatch_loop::{DispatchLoop, SessionEvent};

/// The main server startup function. Runs in the foreground until SIGINT or
/// SIGTERM.
pub async fn run(config: Config, store: Arc<dyn DataStore>) -> Result<()> {
    // 1. Connect the database, build the command table, bind the listener.
    let mut server_context = initialization::setup(config, store).await?;

    // 2. Spawn the dispatch loop and the optional metrics server.
    spawner::spawn_all(&mut server_context)?;

    // 3. Translate OS signals into the shutdown broadcast.
    let shutdown_tx = server_context.shutdown_tx.clone();
    tokio::spawn(async move {
        match wait_for_signal().await {
            Ok(()) => {
                let _ = shutdown_tx.send(());
            }
            Err(e) => error!("Failed to register signal handlers: {}", e),
        }
    });

    // 4. Accept connections until shutdown.
    connection_loop::run(server_context).await;

    Ok(())
}

/// Starts the server in the background and returns a handle to it.
///
/// Fails with the same startup errors as [`run`], before any connection is
/// accepted.
pub async fn start(config: Config, store: Arc<dyn DataStore>) -> Result<ServerHandle, ServerError> {
    let mut server_context = initialization::setup(config, store).await?;
    spawner::spawn_all(&mut server_context)?;

    let local_addr = server_context.listener.local_addr()?;
    let shutdown_tx = server_context.shutdown_tx.clone();
    let events_tx = server_context.events_tx.clone();
    let task = tokio::spawn(connection_loop::run(server_context));

    Ok(ServerHandle {
        local_addr,
        shutdown_tx,
        events_tx,
        task,
    })
}

/// A running server started with [`start`].
pub struct ServerHandle {
    local_addr: SocketAddr,
    shutdown_tx: broadcast::Sender<()>,
    events_tx: UnboundedSender<SessionEvent>,
    task: JoinHandle<()>,
}

impl ServerHandle {
    /// The address the listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Ids of all currently open sessions, sorted.
    pub async fn active_sessions(&self) -> Result<Vec<u64>, ServerError> {
        let (reply, reply_rx) = oneshot::channel();
        self.events_tx
            .send(SessionEvent::ListSessions { reply })
            .map_err(|_| ServerError::DispatcherClosed)?;
        reply_rx.await.map_err(|_| ServerError::DispatcherClosed)
    }

    /// Stops accepting, closes every session and waits for the server to stop.
    pub async fn shutdown(self) -> Result<(), ServerError> {
        let ServerHandle {
            shutdown_tx,
            events_tx,
            task,
            ..
        } = self;
        info!("Shutdown requested through the server handle.");
        let _ = shutdown_tx.send(());
        drop(events_tx);
        task.await
            .map_err(|e| ServerError::Internal(format!("server task failed: {e}")))
    }
}

#[cfg(unix)]
async fn wait_for_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    tokio::select! {
        _ = sigint.recv() => info!("SIGINT received, initiating graceful shutdown."),
        _ = sigterm.recv() => info!("SIGTERM received, initiating graceful shutdown."),
    }
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await?;
    info!("Ctrl-C received, initiating graceful shutdown.");
    Ok(())
}
