// src/connection/guard.rs

//! Defines `ConnectionGuard`, an RAII guard for session registration.

use crate::core::errors::ServerError;
use crate::core::metrics;
use crate::server::SessionEvent;
use std::net::SocketAddr;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

/// Registers a session with the dispatch loop on creation and removes it
/// when dropped, whichever path the connection handler exits through.
pub struct ConnectionGuard {
    events: UnboundedSender<SessionEvent>,
    session_id: u64,
    addr: SocketAddr,
}

impl ConnectionGuard {
    /// Announces the session to the dispatch loop.
    pub fn open(
        events: UnboundedSender<SessionEvent>,
        session_id: u64,
        addr: SocketAddr,
    ) -> Result<Self, ServerError> {
        events
            .send(SessionEvent::Opened { session_id, addr })
            .map_err(|_| ServerError::DispatcherClosed)?;
        metrics::CONNECTED_CLIENTS.inc();
        Ok(Self {
            events,
            session_id,
            addr,
        })
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        metrics::CONNECTED_CLIENTS.dec();
        debug!(
            "ConnectionGuard dropping, closing session {} for {}",
            self.session_id, self.addr
        );
        if self
            .events
            .send(SessionEvent::Closed {
                session_id: self.session_id,
            })
            .is_err()
        {
            debug!(
                "Dispatch loop already stopped; session {} needs no removal.",
                self.session_id
            );
        }
    }
}
