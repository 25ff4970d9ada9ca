// src/core/storage/mod.rs

//! The persistence collaborator queried by command handlers.
//!
//! Handlers only see the [`DataStore`] trait. Two implementations ship with
//! the server: [`JsonFileStore`], which serves a JSON document on disk, and
//! [`MemoryStore`], an in-process store used by tests and benchmarks.

mod json_file;
mod memory;

pub use json_file::{Credentials, Dataset, JsonFileStore};
pub use memory::MemoryStore;

use crate::core::errors::StoreError;
use crate::core::protocol::Record;
use async_trait::async_trait;

/// Field of a person record holding the login password.
pub const PERSON_PASSWORD_FIELD: &str = "people_password";

/// Read access to the back-office data the command handlers expose.
///
/// An empty result is a valid answer; `Err` means the store itself failed.
#[async_trait]
pub trait DataStore: Send + Sync + 'static {
    /// Opens the database `name` with the given credentials.
    async fn connect(&self, name: &str, user: &str, password: &str) -> Result<(), StoreError>;

    /// Finds the person whose password equals `password`.
    async fn get_person(&self, password: &str) -> Result<Option<Record>, StoreError>;

    async fn get_peoples(&self) -> Result<Vec<Record>, StoreError>;

    async fn get_items_groups(&self) -> Result<Vec<Record>, StoreError>;

    async fn get_items(&self) -> Result<Vec<Record>, StoreError>;

    async fn get_tables(&self) -> Result<Vec<Record>, StoreError>;

    /// Occupancy state of every table.
    async fn get_table_busy(&self) -> Result<Vec<Record>, StoreError>;
}

/// Returns true if `record` is a person whose password is `password`.
pub(crate) fn person_matches(record: &Record, password: &str) -> bool {
    record
        .get(PERSON_PASSWORD_FIELD)
        .and_then(|value| value.as_str())
        .is_some_and(|stored| stored == password)
}
