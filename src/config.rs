// src/config.rs

//! Manages server configuration: loading and validation.

use crate::core::commands::{DEFAULT_TIME_FORMAT, TimeZone};
use anyhow::{Context, Result, anyhow};
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::fs;

/// Where and how to open the back-office database.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DatabaseConfig {
    /// The database name. For the JSON file store this is the file path.
    #[serde(default = "default_database_name")]
    pub name: String,
    #[serde(default = "default_database_user")]
    pub user: String,
    #[serde(default = "default_database_password")]
    pub password: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            name: default_database_name(),
            user: default_database_user(),
            password: default_database_password(),
        }
    }
}

fn default_database_name() -> String {
    "data/rpserver.json".to_string()
}
fn default_database_user() -> String {
    "SYSDBA".to_string()
}
fn default_database_password() -> String {
    "masterkey".to_string()
}

/// Switches that keep older clients working.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct CompatConfig {
    /// If true, `get_items_groups` and `get_items` answer with
    /// `res: "get_peoples"`, as the first generation of terminals expects.
    #[serde(default)]
    pub legacy_response_names: bool,
}

/// Configuration for the Prometheus metrics exporter.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct MetricsConfig {
    /// If true, an HTTP server will be started to expose Prometheus metrics.
    #[serde(default)]
    pub enabled: bool,
    /// The port for the Prometheus metrics server.
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

fn default_metrics_port() -> u16 {
    9878
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8765
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_max_clients() -> usize {
    256
}
fn default_time_format() -> String {
    DEFAULT_TIME_FORMAT.to_string()
}
fn default_handshake_timeout_secs() -> u64 {
    10
}
fn default_max_message_size() -> usize {
    64 * 1024
}

/// The validated server configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    /// The WebSocket listen port.
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_max_clients")]
    pub max_clients: usize,
    /// `strftime` pattern used by `get_time`.
    #[serde(default = "default_time_format")]
    pub time_format: String,
    /// Clock `get_time` reads. `utc` never runs backwards at a DST change.
    #[serde(default)]
    pub time_zone: TimeZone,
    /// Seconds a new connection gets to complete the WebSocket upgrade.
    #[serde(default = "default_handshake_timeout_secs")]
    pub handshake_timeout_secs: u64,
    /// Largest inbound message or frame, in bytes.
    #[serde(default = "default_max_message_size")]
    pub max_message_size: usize,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub compat: CompatConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            max_clients: default_max_clients(),
            time_format: default_time_format(),
            time_zone: TimeZone::default(),
            handshake_timeout_secs: default_handshake_timeout_secs(),
            max_message_size: default_max_message_size(),
            database: DatabaseConfig::default(),
            compat: CompatConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Config {
    /// Creates a new `Config` instance by reading and parsing a TOML file.
    pub fn from_file(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file at '{path}'"))?;
        let config = Self::from_toml(&contents)
            .with_context(|| format!("Invalid configuration in '{path}'"))?;
        Ok(config)
    }

    /// Parses and validates a TOML document.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents).context("Failed to parse TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration to ensure logical consistency.
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(anyhow!("port cannot be 0"));
        }
        if self.max_clients == 0 {
            return Err(anyhow!("max_clients must be at least 1"));
        }
        if self.database.name.trim().is_empty() {
            return Err(anyhow!("database.name cannot be empty"));
        }
        if self.time_format.is_empty() {
            return Err(anyhow!("time_format cannot be empty"));
        }
        if StrftimeItems::new(&self.time_format).any(|item| matches!(item, Item::Error)) {
            return Err(anyhow!(
                "time_format '{}' is not a valid strftime pattern",
                self.time_format
            ));
        }
        if self.handshake_timeout_secs == 0 {
            return Err(anyhow!("handshake_timeout_secs must be at least 1"));
        }
        if self.max_message_size == 0 {
            return Err(anyhow!("max_message_size cannot be 0"));
        }
        if self.metrics.enabled && self.metrics.port == self.port {
            return Err(anyhow!(
                "metrics.port must differ from the listen port ({})",
                self.port
            ));
        }
        Ok(())
    }

    /// Replaces the listen port and validates the result again.
    pub fn with_port(mut self, port: u16) -> Result<Self> {
        self.port = port;
        self.validate()?;
        Ok(self)
    }

    /// The `host:port` pair the listener binds to.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
