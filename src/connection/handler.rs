// src/connection/handler.rs

//! Defines the `ConnectionHandler` which manages the full lifecycle of a session.

use super::guard::ConnectionGuard;
use crate::core::errors::ServerError;
use crate::core::protocol::UNKNOWN_CMD_JSON;
use crate::server::SessionEvent;
use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::{broadcast, oneshot};
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

/// Drives one WebSocket session: `Open ⟲ request/response` until the peer
/// closes, the transport fails, or the server shuts down.
///
/// Each text frame is answered with exactly one text frame, and the next
/// frame is not read until that answer has been written.
pub struct ConnectionHandler<S> {
    ws: WebSocketStream<S>,
    addr: SocketAddr,
    session_id: u64,
    events: UnboundedSender<SessionEvent>,
    shutdown_rx: broadcast::Receiver<()>,
}

impl<S> ConnectionHandler<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(
        ws: WebSocketStream<S>,
        addr: SocketAddr,
        session_id: u64,
        events: UnboundedSender<SessionEvent>,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Self {
        Self {
            ws,
            addr,
            session_id,
            events,
            shutdown_rx,
        }
    }

    /// The main event loop for the session.
    pub async fn run(&mut self) -> Result<(), ServerError> {
        let _guard = ConnectionGuard::open(self.events.clone(), self.session_id, self.addr)?;

        loop {
            tokio::select! {
                biased;
                _ = self.shutdown_rx.recv() => {
                    info!("Session {} for {} received shutdown signal.", self.session_id, self.addr);
                    if let Err(e) = self.ws.close(None).await {
                        debug!("Close frame to {} not delivered: {}", self.addr, e);
                    }
                    break;
                }
                message = self.ws.next() => {
                    match message {
                        Some(Ok(Message::Text(text))) => {
                            debug!("Session {}: Received frame: {}", self.session_id, text);
                            let response = self.round_trip(text).await?;
                            debug!("Session {}: Sending response: {}", self.session_id, response);
                            self.ws.send(Message::Text(response)).await?;
                        }
                        Some(Ok(Message::Binary(_))) => {
                            debug!("Session {}: Binary frame answered with unknown_cmd.", self.session_id);
                            self.ws.send(Message::Text(UNKNOWN_CMD_JSON.to_string())).await?;
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            debug!("Connection from {} closed by peer.", self.addr);
                            break;
                        }
                        // Pongs are queued by the transport itself.
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            let e = ServerError::from(e);
                            if e.is_normal_disconnect() {
                                debug!("Connection from {} closed by peer: {}", self.addr, e);
                            } else {
                                warn!("Connection error for {}: {}", self.addr, e);
                            }
                            break;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Hands a frame to the dispatch loop and waits for its serialized answer.
    async fn round_trip(&self, text: String) -> Result<String, ServerError> {
        let (reply, reply_rx) = oneshot::channel();
        self.events
            .send(SessionEvent::Frame {
                session_id: self.session_id,
                text,
                reply,
            })
            .map_err(|_| ServerError::DispatcherClosed)?;
        reply_rx.await.map_err(|_| ServerError::DispatcherClosed)
    }
}
