//! Runtime configuration read from the environment.

use std::path::PathBuf;

use thiserror::Error;

pub const DEFAULT_DB_PATH: &str = "database.db";
/// Loopback only. Set `TODO_ADDR=0.0.0.0` to accept remote clients.
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid PORT value {0:?}")]
    InvalidPort(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// SQLite file backing the store (`TODO_DB_PATH`).
    pub db_path: PathBuf,
    /// Interface to bind (`TODO_ADDR`).
    pub host: String,
    /// TCP port to bind (`PORT`).
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from `lookup`, falling back to defaults for unset keys.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = lookup("TODO_DB_PATH") {
            config.db_path = PathBuf::from(path);
        }
        if let Some(host) = lookup("TODO_ADDR") {
            config.host = host;
        }
        if let Some(port) = lookup("PORT") {
            config.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(port.clone()))?;
        }

        Ok(config)
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
