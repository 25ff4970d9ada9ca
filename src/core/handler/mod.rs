// src/core/handler/mod.rs

pub mod dispatcher;
pub mod registry;

pub use dispatcher::Dispatcher;
pub use registry::{CommandRegistry, RegistryBuilder};
