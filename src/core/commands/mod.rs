// src/core/commands/mod.rs

//! The command handlers and the trait they share.
//!
//! Every handler is a function of the request envelope and the persistence
//! collaborator. Handlers never touch session or registry state, and every
//! outcome, including a failing store, is expressed as a `Response`.

pub mod command_trait;
pub mod listing;
pub mod login;
pub mod time;

pub use command_trait::CommandHandler;
pub use listing::{ListCommand, ListQuery};
pub use login::Login;
pub use time::{DEFAULT_TIME_FORMAT, GetTime, TimeZone};

pub const CMD_LOGIN: &str = "login";
pub const CMD_GET_PEOPLES: &str = "get_peoples";
pub const CMD_ITEMS_GROUPS: &str = "get_items_groups";
pub const CMD_ITEMS: &str = "get_items";
pub const CMD_GET_TABLES: &str = "get_tables";
pub const CMD_GET_TABLE_BUSY: &str = "get_table_busy";
pub const CMD_GET_TIME: &str = "get_time";

/// Every command name the server answers, in registration order.
pub const ALL_COMMANDS: [&str; 7] = [
    CMD_LOGIN,
    CMD_GET_PEOPLES,
    CMD_ITEMS_GROUPS,
    CMD_ITEMS,
    CMD_GET_TABLES,
    CMD_GET_TABLE_BUSY,
    CMD_GET_TIME,
];
