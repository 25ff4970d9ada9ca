// src/server/dispatch_loop.rs

//! The single dispatch context.
//!
//! Every session talks to one `DispatchLoop` over a channel. The loop handles
//! one event to completion before taking the next, so frames from all
//! connections are dispatched strictly one after another and the session map
//! is only ever touched from this task.

use crate::connection::SessionInfo;
use crate::core::errors::ServerError;
use crate::core::handler::Dispatcher;
use std::collections::HashMap;
use std::net::SocketAddr;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::oneshot;
use tracing::{Instrument, debug, info, info_span};

/// Events sent from sessions (and the server handle) to the dispatch loop.
#[derive(Debug)]
pub enum SessionEvent {
    /// A connection completed its handshake.
    Opened { session_id: u64, addr: SocketAddr },
    /// One inbound text frame; the serialized response goes to `reply`.
    Frame {
        session_id: u64,
        text: String,
        reply: oneshot::Sender<String>,
    },
    /// The session is gone. Irreversible.
    Closed { session_id: u64 },
    /// Asks for the ids of all open sessions, sorted.
    ListSessions { reply: oneshot::Sender<Vec<u64>> },
}

pub struct DispatchLoop {
    dispatcher: Dispatcher,
    events_rx: UnboundedReceiver<SessionEvent>,
    sessions: HashMap<u64, SessionInfo>,
}

impl DispatchLoop {
    pub fn new(dispatcher: Dispatcher, events_rx: UnboundedReceiver<SessionEvent>) -> Self {
        Self {
            dispatcher,
            events_rx,
            sessions: HashMap::new(),
        }
    }

    /// Runs until every event sender has been dropped.
    pub async fn run(mut self) -> Result<(), ServerError> {
        info!(
            "Dispatch loop started with {} commands: {:?}",
            self.dispatcher.registry().len(),
            self.dispatcher.registry().names()
        );
        while let Some(event) = self.events_rx.recv().await {
            self.handle_event(event).await;
        }
        info!("Dispatch loop stopped ({} sessions left).", self.sessions.len());
        Ok(())
    }

    async fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Opened { session_id, addr } => {
                self.sessions
                    .insert(session_id, SessionInfo::new(session_id, addr));
                info!(
                    "Session {} opened for {} ({} active).",
                    session_id,
                    addr,
                    self.sessions.len()
                );
            }
            SessionEvent::Frame {
                session_id,
                text,
                reply,
            } => {
                let span = info_span!("session", id = session_id);
                let response = self.dispatcher.dispatch(&text).instrument(span).await;
                match self.sessions.get_mut(&session_id) {
                    Some(session) => session.touch(),
                    None => debug!("Frame from unregistered session {}.", session_id),
                }
                if reply.send(response).is_err() {
                    debug!("Session {} went away before its response was ready.", session_id);
                }
            }
            SessionEvent::Closed { session_id } => {
                if let Some(session) = self.sessions.remove(&session_id) {
                    info!(
                        "Session {} for {} closed after {} requests, open {:.1?}, idle {:.1?} ({} active).",
                        session_id,
                        session.addr,
                        session.requests,
                        session.lifetime(),
                        session.idle(),
                        self.sessions.len()
                    );
                }
            }
            SessionEvent::ListSessions { reply } => {
                let mut ids: Vec<u64> = self.sessions.keys().copied().collect();
                ids.sort_unstable();
                let _ = reply.send(ids);
            }
        }
    }
}
