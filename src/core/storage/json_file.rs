// src/core/storage/json_file.rs

//! A `DataStore` backed by a JSON document on disk.

use super::{DataStore, person_matches};
use crate::core::errors::StoreError;
use crate::core::protocol::Record;
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Login pair a dataset may require from `connect`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

/// The full contents of a back-office database.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    /// When present, `connect` must be called with this user and password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Credentials>,
    #[serde(default)]
    pub peoples: Vec<Record>,
    #[serde(default)]
    pub items_groups: Vec<Record>,
    #[serde(default)]
    pub items: Vec<Record>,
    #[serde(default)]
    pub tables: Vec<Record>,
    #[serde(default)]
    pub table_busy: Vec<Record>,
}

impl Dataset {
    pub(crate) fn check_credentials(&self, user: &str, password: &str) -> Result<(), StoreError> {
        match &self.credentials {
            Some(creds) if creds.user != user || creds.password != password => {
                Err(StoreError::Credentials(user.to_string()))
            }
            _ => Ok(()),
        }
    }

    pub(crate) fn find_person(&self, password: &str) -> Option<Record> {
        self.peoples
            .iter()
            .find(|person| person_matches(person, password))
            .cloned()
    }
}

/// Serves a [`Dataset`] read from the file named by the database name.
///
/// The file is read once, on `connect`. Queries before a successful connect
/// fail with [`StoreError::NotConnected`].
#[derive(Debug, Default)]
pub struct JsonFileStore {
    dataset: RwLock<Option<Dataset>>,
}

impl JsonFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read<T>(&self, f: impl FnOnce(&Dataset) -> T) -> Result<T, StoreError> {
        let guard = self.dataset.read();
        guard.as_ref().map(f).ok_or(StoreError::NotConnected)
    }
}

#[async_trait]
impl DataStore for JsonFileStore {
    async fn connect(&self, name: &str, user: &str, password: &str) -> Result<(), StoreError> {
        let contents = tokio::fs::read_to_string(name)
            .await
            .map_err(|e| StoreError::Open {
                name: name.to_string(),
                reason: e.to_string(),
            })?;
        let dataset: Dataset = serde_json::from_str(&contents).map_err(|e| StoreError::Parse {
            name: name.to_string(),
            reason: e.to_string(),
        })?;
        dataset.check_credentials(user, password)?;

        info!(
            "Loaded database '{}' ({} peoples, {} items, {} tables).",
            name,
            dataset.peoples.len(),
            dataset.items.len(),
            dataset.tables.len()
        );
        *self.dataset.write() = Some(dataset);
        Ok(())
    }

    async fn get_person(&self, password: &str) -> Result<Option<Record>, StoreError> {
        let person = self.read(|data| data.find_person(password))?;
        debug!("Person lookup matched: {}", person.is_some());
        Ok(person)
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
