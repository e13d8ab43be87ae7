//! Configuration management for graphload.
//!
//! Configuration is loaded from (in priority order):
//! 1. Environment variables (`GRAPHLOAD__` prefix, `__` separator,
//!    e.g. `GRAPHLOAD__GRAPH__HOST`)
//! 2. Config file (`graphload.toml`)
//! 3. Defaults
//!
//! The `[graph]` section is read into [`ConnectionSettings`], which is then
//! validated into a [`ConnectionConfig`] before any connection is attempted.

use serde::Deserialize;

use crate::error::{ConfigError, Result};

/// Environment variable prefix for all graphload settings.
pub const ENV_PREFIX: &str = "GRAPHLOAD";

/// Default config file prefix (resolved to `graphload.toml` and friends).
pub const DEFAULT_FILE_PREFIX: &str = "graphload";

/// Connection settings as read from file and environment.
///
/// Every required field is optional here so that a partially configured
/// deployment can be reported with all of its gaps at once.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConnectionSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
    #[serde(default)]
    pub username: Option<String>,
    pub password: Option<String>,
    pub graph_name: Option<String>,

    /// Rows fetched per round trip by the driver.
    #[serde(default = "default_fetch_size")]
    pub fetch_size: usize,
}

/// A complete, validated set of connection parameters.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: String,
    pub graph_name: String,
    pub fetch_size: usize,
}

/// Build the layered configuration: `<file_prefix>.*` overlaid by
/// `GRAPHLOAD__*` environment variables.
///
/// Environment values stay strings until deserialization, so a password
/// like `007` is not read back as `7`.
pub fn load_config(file_prefix: &str) -> Result<config::Config> {
    let cfg = config::Config::builder()
        .add_source(config::File::with_name(file_prefix).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX).separator("__"),
        )
        .build()?;
    Ok(cfg)
}

fn default_fetch_size() -> usize {
    256
}

impl ConnectionSettings {
    /// Load the `[graph]` section from `<file_prefix>.*` and the environment.
    ///
    /// A missing file is not an error; a malformed one is.
    pub fn load(file_prefix: &str) -> Result<Self> {
        Self::from_config(&load_config(file_prefix)?)
    }

    /// Extract settings from an already-built configuration.
    pub fn from_config(cfg: &config::Config) -> Result<Self> {
        match cfg.get::<ConnectionSettings>("graph") {
            Ok(settings) => Ok(settings),
            Err(config::ConfigError::NotFound(_)) => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Check that host, port, password and graph name are all present.
    ///
    /// Empty strings and a zero port count as missing. The error lists every
    /// missing field, not only the first.
    pub fn validate(self) -> Result<ConnectionConfig> {
        let mut missing = Vec::new();

        let host = non_empty(self.host);
        if host.is_none() {
            missing.push("host");
        }
        let port = self.port.filter(|p| *p != 0);
        if port.is_none() {
            missing.push("port");
        }
        let password = non_empty(self.password);
        if password.is_none() {
            missing.push("password");
        }
        let graph_name = non_empty(self.graph_name);
        if graph_name.is_none() {
            missing.push("graph_name");
        }

        match (host, port, password, graph_name) {
            (Some(host), Some(port), Some(password), Some(graph_name)) => Ok(ConnectionConfig {
                host,
                port,
                username: non_empty(self.username),
                password,
                graph_name,
                fetch_size: self.fetch_size,
            }),
            _ => {
                tracing::debug!(missing = ?missing, "Connection settings incomplete");
                Err(ConfigError::Missing { fields: missing })
            }
        }
    }
}

impl ConnectionConfig {
    /// `host:port`, as used in logs and error messages.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// Keeps the password out of logs.
impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("graph_name", &self.graph_name)
            .field("fetch_size", &self.fetch_size)
            .finish()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
