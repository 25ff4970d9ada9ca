// src/server/connection_loop.rs

//! Contains the main server loop for accepting connections and handling graceful shutdown.

use super::context::ServerContext;
use super::dispatch_loop::SessionEvent;
use crate::config::Config;
use crate::connection::ConnectionHandler;
use crate::core::metrics;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::{OwnedSemaphorePermit, broadcast};
use tokio::task::JoinSet;
use tokio_tungstenite::accept_async_with_config;
use tokio_tungstenite::tungstenite::protocol::WebSocketConfig;
use tracing::{debug, error, info, warn};

const SESSION_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);
const BACKGROUND_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// The main server loop. Accepts connections until a shutdown signal arrives
/// on `ctx.shutdown_tx` or a background task dies.
pub async fn run(mut ctx: ServerContext) {
    let mut session_id_counter: u64 = 0;
    let mut client_tasks = JoinSet::new();
    let handshake = Handshake::from_config(&ctx.config);

    loop {
        tokio::select! {
            biased;

            _ = ctx.shutdown_rx.recv() => {
                info!("Shutdown requested, no longer accepting connections.");
                break;
            }

            Some(res) = ctx.background_tasks.join_next() => {
                match res {
                    Ok(Ok(())) => warn!("A background task finished unexpectedly without an error."),
                    Ok(Err(e)) => { error!("CRITICAL: Background task failed: {}. Shutting down.", e); break; }
                    Err(e) => { error!("CRITICAL: Background task panicked: {e:?}. Shutting down."); break; }
                }
            },

            res = ctx.listener.accept() => {
                match res {
                    Ok((socket, addr)) => {
                        metrics::CONNECTIONS_RECEIVED_TOTAL.inc();
                        match ctx.connection_permits.clone().try_acquire_owned() {
                            Ok(permit) => {
                                info!("Accepted new connection from: {}", addr);
                                session_id_counter = session_id_counter.wrapping_add(1);
                                let events = ctx.events_tx.clone();
                                let shutdown = ctx.shutdown_tx.subscribe();
                                client_tasks.spawn(serve_connection(
                                    handshake.clone(),
                                    socket,
                                    addr,
                                    session_id_counter,
                                    events,
                                    shutdown,
                                    permit,
                                ));
                            }
                            Err(_) => {
                                metrics::CONNECTIONS_REJECTED_TOTAL.inc();
                                warn!(
                                    "Rejecting connection from {}: max_clients ({}) reached.",
                                    addr, ctx.config.max_clients
                                );
                                drop(socket);
                            }
                        }
                    }
                    Err(e) => error!("Failed to accept connection: {}", e),
                }
            },

            Some(res) = client_tasks.join_next() => {
                if let Err(e) = res
                    && e.is_panic()
                {
                    error!("A client handler panicked: {e:?}");
                }
            },
        }
    }

    info!("Shutting down. Sending signal to all sessions.");
    if ctx.shutdown_tx.send(()).is_err() {
        debug!("No task was listening for the shutdown signal.");
    }

    if tokio::time::timeout(SESSION_DRAIN_TIMEOUT, async {
        while client_tasks.join_next().await.is_some() {}
    })
    .await
    .is_err()
    {
        warn!("Timed out waiting for sessions to close; aborting the rest.");
        client_tasks.shutdown().await;
    }
    info!("All client connections closed.");

    // Dropping the last event sender lets the dispatch loop drain and stop.
    drop(ctx.events_tx);
    info!("Waiting for background tasks to finish...");
    if tokio::time::timeout(BACKGROUND_DRAIN_TIMEOUT, async {
        while ctx.background_tasks.join_next().await.is_some() {}
    })
    .await
    .is_err()
    {
        warn!("Timed out waiting for background tasks to finish cleanly.");
    }
    info!("Server shutdown complete.");
}

/// WebSocket upgrade settings shared by every connection.
#[derive(Clone)]
struct Handshake {
    timeout: Duration,
    ws_config: WebSocketConfig,
}

impl Handshake {
    fn from_config(config: &Config) -> Self {
        Self {
            timeout: Duration::from_secs(config.handshake_timeout_secs),
            ws_config: WebSocketConfig {
                max_message_size: Some(config.max_message_size),
                max_frame_size: Some(config.max_message_size),
                ..Default::default()
            },
        }
    }
}

/// Performs the WebSocket handshake and runs the session to completion.
///
/// The connection permit is released if the peer does not finish the upgrade
/// within the handshake timeout.
async fn serve_connection(
    handshake: Handshake,
    socket: TcpStream,
    addr: SocketAddr,
    session_id: u64,
    events: UnboundedSender<SessionEvent>,
    shutdown: broadcast::Receiver<()>,
    _permit: OwnedSemaphorePermit,
) {
    let upgrade = accept_async_with_config(socket, Some(handshake.ws_config));
    let ws = match tokio::time::timeout(handshake.timeout, upgrade).await {
        Ok(Ok(ws)) => ws,
        Ok(Err(e)) => {
            warn!("WebSocket handshake with {} failed: {}", addr, e);
            return;
        }
        Err(_) => {
            metrics::HANDSHAKE_TIMEOUTS_TOTAL.inc();
            warn!(
                "WebSocket handshake with {} timed out after {:?}; dropping it.",
                addr, handshake.timeout
            );
            return;
        }
    };

    let mut handler = ConnectionHandler::new(ws, addr, session_id, events, shutdown);
    if let Err(e) = handler.run().await {
        warn!("Connection from {} terminated unexpectedly: {}", addr, e);
    }
}
