// src/core/commands/time.rs

use super::{CMD_GET_TIME, CommandHandler};
use crate::core::protocol::{Request, Response};
use crate::core::storage::DataStore;
use async_trait::async_trait;
use chrono::{Local, Utc};
use serde::{Deserialize, Serialize};

/// Sorts lexicographically in time order, so clients can compare raw strings.
pub const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The clock `get_time` reports.
///
/// Local wall-clock time repeats an hour when daylight saving ends; clients
/// that need strictly non-decreasing values should use `Utc`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TimeZone {
    #[default]
    Local,
    Utc,
}

/// `get_time`: the server's current time, rendered with a fixed format.
#[derive(Debug, Clone)]
pub struct GetTime {
    format: String,
    zone: TimeZone,
}

impl GetTime {
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
            zone: TimeZone::Local,
        }
    }

    pub fn with_zone(mut self, zone: TimeZone) -> Self {
        self.zone = zone;
        self
    }

    fn now(&self) -> String {
        match self.zone {
            TimeZone::Local => Local::now().format(&self.format).to_string(),
            TimeZone::Utc => Utc::now().format(&self.format).to_string(),
        }
    }
}

impl Default for GetTime {
    fn default() -> Self {
        Self::new(DEFAULT_TIME_FORMAT)
    }
}

#[async_trait]
impl CommandHandler for GetTime {
    fn name(&self) -> &'static str {
        CMD_GET_TIME
    }

    async fn execute(&self, _request: &Request, _store: &dyn DataStore) -> Response {
        Response::success(CMD_GET_TIME).with("time", self.now())
    }
}
