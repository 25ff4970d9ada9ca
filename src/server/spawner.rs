// src/server/spawner.rs

//! Spawns the server's long-running background tasks.

use super::context::ServerContext;
use super::dispatch_loop::DispatchLoop;
use super::metrics_server;
use crate::core::errors::ServerError;
use tracing::info;

/// Spawns the dispatch loop and, if enabled, the metrics server.
pub fn spawn_all(ctx: &mut ServerContext) -> Result<(), ServerError> {
    let init = ctx
        .dispatch_init
        .take()
        .ok_or_else(|| ServerError::Internal("dispatch loop already spawned".into()))?;

    let dispatch_loop = DispatchLoop::new(init.dispatcher, init.events_rx);
    ctx.background_tasks.spawn(dispatch_loop.run());

    if ctx.config.metrics.enabled {
        let port = ctx.config.metrics.port;
        let shutdown_rx = ctx.shutdown_tx.subscribe();
        ctx.background_tasks.spawn(async move {
            metrics_server::run_metrics_server(port, shutdown_rx).await;
            Ok(())
        });
    } else {
        info!("Prometheus metrics server is disabled in the configuration.");
    }

    Ok(())
}
