// src/core/storage/memory.rs

//! An in-process `DataStore`.

use super::DataStore;
use super::json_file::Dataset;
use crate::core::errors::StoreError;
use crate::core::protocol::Record;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

/// Holds a [`Dataset`] in memory. Always connected.
///
/// `set_unavailable(true)` makes every query fail, which lets callers
/// exercise the collaborator-failure path.
#[derive(Debug, Default)]
pub struct MemoryStore {
    dataset: RwLock<Dataset>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new(dataset: Dataset) -> Self {
        Self {
            dataset: RwLock::new(dataset),
            unavailable: AtomicBool::new(false),
        }
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Replaces the table occupancy list.
    pub fn set_table_busy(&self, table_busy: Vec<Record>) {
        self.dataset.write().table_busy = table_busy;
    }

    fn read<T>(&self, f: impl FnOnce(&Dataset) -> T) -> Result<T, StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store switched off".into()));
        }
        Ok(f(&self.dataset.read()))
    }
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn connect(&self, _name: &str, user: &str, password: &str) -> Result<(), StoreError> {
        self.read(|data| data.check_credentials(user, password))?
    }

    async fn get_person(&self, password: &str) -> Result<Option<Record>, StoreError> {
        self.read(|data| data.find_person(password))
    }

    async fn get_peoples(&self) -> Result<Vec<Record>, StoreError> {
        self.read(|data| data.peoples.clone())
    }

    async fn get_items_groups(&self) -> Result<Vec<Record>, StoreError> {
        self.read(|data| data.items_groups.clone())
    }

    async fn get_items(&self) -> Result<Vec<Record>, StoreError> {
        self.read(|data| data.items.clone())
    }

    async fn get_tables(&self) -> Result<Vec<Record>, StoreError> {
        self.read(|data| data.tables.clone())
    }

    async fn get_table_busy(&self) -> Result<Vec<Record>, StoreError> {
        self.read(|data| data.table_busy.clone())
    }
}
