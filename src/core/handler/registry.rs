// src/core/handler/registry.rs

//! The static command table.

use crate::config::Config;
use crate::core::commands::{CommandHandler, GetTime, ListCommand, ListQuery, Login};
use crate::core::errors::ServerError;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Maps command names to their handlers.
///
/// Built once during initialization and never mutated afterwards. Lookup is
/// an exact, case-sensitive match.
#[derive(Clone, Default)]
pub struct CommandRegistry {
    handlers: HashMap<&'static str, Arc<dyn CommandHandler>>,
}

impl CommandRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// The full command table with default settings.
    pub fn standard() -> Self {
        Self::from_config(&Config::default())
    }

    /// The full command table, honouring the configured time format and
    /// response naming.
    pub fn from_config(config: &Config) -> Self {
        let mut handlers: HashMap<&'static str, Arc<dyn CommandHandler>> = HashMap::new();
        let mut bind = |handler: Arc<dyn CommandHandler>| {
            handlers.insert(handler.name(), handler);
        };

        bind(Arc::new(Login));
        for query in ListQuery::ALL {
            let command = if config.compat.legacy_response_names {
                ListCommand::legacy(query)
            } else {
                ListCommand::new(query)
            };
            bind(Arc::new(command));
        }
        bind(Arc::new(
            GetTime::new(config.time_format.clone()).with_zone(config.time_zone),
        ));

        Self { handlers }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn CommandHandler>> {
        self.handlers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Registered command names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.handlers.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("commands", &self.names())
            .finish()
    }
}

/// Assembles a custom [`CommandRegistry`], rejecting duplicate bindings.
#[derive(Default)]
pub struct RegistryBuilder {
    handlers: HashMap<&'static str, Arc<dyn CommandHandler>>,
}

impl RegistryBuilder {
    pub fn register(mut self, handler: Arc<dyn CommandHandler>) -> Result<Self, ServerError> {
        let name = handler.name();
        if self.handlers.contains_key(name) {
            return Err(ServerError::Internal(format!(
                "command '{name}' is already registered"
            )));
        }
        self.handlers.insert(name, handler);
        Ok(self)
    }

    pub fn build(self) -> CommandRegistry {
        CommandRegistry {
            handlers: self.handlers,
        }
    }
}
