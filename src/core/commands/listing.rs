// src/core/commands/listing.rs

//! The read-only list commands: `get_peoples`, `get_items_groups`,
//! `get_items`, `get_tables` and `get_table_busy`.

use super::{
    CMD_GET_PEOPLES, CMD_GET_TABLE_BUSY, CMD_GET_TABLES, CMD_ITEMS, CMD_ITEMS_GROUPS,
    CommandHandler,
};
use crate::core::errors::StoreError;
use crate::core::protocol::{ApiError, Record, Request, Response};
use crate::core::storage::DataStore;
use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

/// Which collection a [`ListCommand`] returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListQuery {
    Peoples,
    ItemsGroups,
    Items,
    Tables,
    TableBusy,
}

impl ListQuery {
    pub const ALL: [ListQuery; 5] = [
        ListQuery::Peoples,
        ListQuery::ItemsGroups,
        ListQuery::Items,
        ListQuery::Tables,
        ListQuery::TableBusy,
    ];

    /// The command name bound to this query.
    pub fn command(self) -> &'static str {
        match self {
            ListQuery::Peoples => CMD_GET_PEOPLES,
            ListQuery::ItemsGroups => CMD_ITEMS_GROUPS,
            ListQuery::Items => CMD_ITEMS,
            ListQuery::Tables => CMD_GET_TABLES,
            ListQuery::TableBusy => CMD_GET_TABLE_BUSY,
        }
    }

    /// The response field holding the list.
    pub fn field(self) -> &'static str {
        match self {
            ListQuery::Peoples => "peoples",
            ListQuery::ItemsGroups => "groups",
            ListQuery::Items => "items",
            ListQuery::Tables | ListQuery::TableBusy => "tables",
        }
    }

    /// The `res` value older clients expect. Groups and items were always
    /// answered as `get_peoples`.
    pub fn legacy_res(self) -> &'static str {
        match self {
            ListQuery::ItemsGroups | ListQuery::Items => CMD_GET_PEOPLES,
            other => other.command(),
        }
    }

    async fn fetch(self, store: &dyn DataStore) -> Result<Vec<Record>, StoreError> {
        match self {
            ListQuery::Peoples => store.get_peoples().await,
            ListQuery::ItemsGroups => store.get_items_groups().await,
            ListQuery::Items => store.get_items().await,
            ListQuery::Tables => store.get_tables().await,
            ListQuery::TableBusy => store.get_table_busy().await,
        }
    }
}

/// Returns one collection from the store under [`ListQuery::field`].
#[derive(Debug, Clone)]
pub struct ListCommand {
    query: ListQuery,
    res: &'static str,
}

impl ListCommand {
    /// A handler whose `res` echoes its own command name.
    pub fn new(query: ListQuery) -> Self {
        Self {
            query,
            res: query.command(),
        }
    }

    /// A handler whose `res` matches what older clients expect.
    pub fn legacy(query: ListQuery) -> Self {
        Self {
            query,
            res: query.legacy_res(),
        }
    }

    pub fn query(&self) -> ListQuery {
        self.query
    }
}

#[async_trait]
impl CommandHandler for ListCommand {
    fn name(&self) -> &'static str {
        self.query.command()
    }

    async fn execute(&self, _request: &Request, store: &dyn DataStore) -> Response {
        match self.query.fetch(store).await {
            Ok(records) => {
                let list = records.into_iter().map(Value::Object).collect::<Vec<_>>();
                Response::success(self.res).with(self.query.field(), Value::Array(list))
            }
            Err(e) => {
                warn!("'{}' failed to read from the database: {}", self.name(), e);
                Response::failure(self.res, ApiError::Database)
            }
        }
    }
}
