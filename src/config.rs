//! Application configuration, read from a TOML file.
//!
//! Every section and key is optional; missing values fall back to defaults
//! suitable for a local development setup.
use serde_derive::{Deserialize, Serialize};
use std::fs::read_to_string;
use std::path::{Path, PathBuf};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Relational store settings.
    pub database: DatabaseConfig,
    /// Object store settings.
    pub storage: StorageConfig,
    /// Pagination defaults.
    pub pagination: PaginationConfig,
    /// Log output settings.
    pub logging: LoggingConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to.
    pub bind: String,
    /// Port to listen on.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_owned(),
            port: 8080,
        }
    }
}

/// Relational store settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database URL. Overridden by the `DATABASE_URL` environment variable.
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://agora.sqlite3?mode=rwc".to_owned(),
        }
    }
}

/// Which object store implementation to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Objects kept in process memory.
    Memory,
    /// Objects kept as files in a local directory.
    Local,
}

/// Object store settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Backend implementation.
    pub backend: StorageBackend,
    /// Root directory of the local backend.
    pub path: PathBuf,
    /// Public URL under which objects are served.
    pub base_url: String,
    /// Secret used to sign object URLs.
    pub secret: String,
    /// Lifetime of a signed object URL, in seconds.
    pub url_ttl_secs: i64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Local,
            path: PathBuf::from("objects"),
            base_url: "http://127.0.0.1:8080/files".to_owned(),
            secret: "change-me".to_owned(),
            url_ttl_secs: 900,
        }
    }
}

/// Pagination defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Page size used when the request does not give one.
    pub default_size: i64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self { default_size: 10 }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Directory for daily rolling log files. Logs go to stdout when unset.
    pub directory: Option<PathBuf>,
}

impl Config {
    /// Parse a configuration from TOML text.
    ///
    /// # Errors
    /// Errors if the text is not valid TOML or has values of the wrong type.
    pub fn parse(text: &str) -> anyhow::Result<Self> {
        let conf: Self = toml::from_str(text)?;
        Ok(conf)
    }

    /// Load the configuration file at `path`.
    /// A missing file yields the default configuration.
    ///
    /// # Errors
    /// Errors if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::debug!("No config file at '{}', using defaults", path.display());
            return Ok(Self::default());
        }
        let config_str = read_to_string(path)?;
        Self::parse(&config_str)
    }
}
