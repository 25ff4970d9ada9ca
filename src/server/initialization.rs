// src/server/initialization.rs

//! Handles server initialization: connecting the database, building the
//! command table and binding the listener. Any failure here is fatal.

use super::context::{DispatchInit, ServerContext};
use crate::config::Config;
use crate::core::errors::ServerError;
use crate::core::handler::{CommandRegistry, Dispatcher};
use crate::core::storage::DataStore;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::{Semaphore, broadcast, mpsc};
use tokio::task::JoinSet;
use tracing::{error, info};

/// Initializes all server components before starting the main loop.
pub async fn setup(config: Config, store: Arc<dyn DataStore>) -> Result<ServerContext, ServerError> {
    log_startup_info(&config);

    connect_database(&config, store.as_ref()).await?;

    let registry = Arc::new(CommandRegistry::from_config(&config));
    info!("Command table built with {} commands.", registry.len());
    let dispatcher = Dispatcher::new(registry, store);

    let listener = TcpListener::bind((config.host.as_str(), config.port))
        .await
        .map_err(|e| {
            error!("Error starting server on {}: {}", config.listen_addr(), e);
            ServerError::Bind {
                addr: config.listen_addr(),
                source: Arc::new(e),
            }
        })?;
    info!("RPServer listening on {}", listener.local_addr()?);

    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let connection_permits = Arc::new(Semaphore::new(config.max_clients));

    Ok(ServerContext {
        config: Arc::new(config),
        listener,
        events_tx,
        dispatch_init: Some(DispatchInit {
            dispatcher,
            events_rx,
        }),
        shutdown_tx,
        shutdown_rx,
        background_tasks: JoinSet::new(),
        connection_permits,
    })
}

/// Opens the database named in the configuration.
async fn connect_database(config: &Config, store: &dyn DataStore) -> Result<(), ServerError> {
    let db = &config.database;
    match store.connect(&db.name, &db.user, &db.password).await {
        Ok(()) => {
            info!("Connected to database '{}'.", db.name);
            Ok(())
        }
        Err(e) => {
            error!("Error connecting to database '{}': {}", db.name, e);
            Err(ServerError::Database(e))
        }
    }
}

/// Logs key configuration parameters at startup.
fn log_startup_info(config: &Config) {
    info!(
        "Configuration loaded: database '{}', listen port {}, max {} clients.",
        config.database.name, config.port, config.max_clients
    );
    if config.compat.legacy_response_names {
        info!("Legacy response names are enabled for get_items_groups and get_items.");
    }
}
