//! Server configuration from the environment

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// SQLite file; `:memory:` for a throwaway database
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub log_dir: PathBuf,
    /// Comma-separated origins, or `*`. No CORS layer when unset.
    pub cors_origins: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("portfolio.db"),
            host: "127.0.0.1".to_string(),
            port: 3000,
            log_dir: PathBuf::from("logs"),
            cors_origins: None,
        }
    }
}

impl ServerConfig {
    /// Read the process environment. Call `dotenvy::dotenv()` first to pick up `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let value = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port = match value("SERVER_PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                key: "SERVER_PORT",
                value: raw,
            })?,
            None => defaults.port,
        };

        Ok(Self {
            db_path: value("PORTFOLIO_DB_PATH").map(PathBuf::from).unwrap_or(defaults.db_path),
            host: value("SERVER_HOST").unwrap_or(defaults.host),
            port,
            log_dir: value("PORTFOLIO_LOG_DIR").map(PathBuf::from).unwrap_or(defaults.log_dir),
            cors_origins: value("CORS_ALLOWED_ORIGINS"),
        })
    }

    pub fn addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ConfigError::Invalid {
                key: "SERVER_HOST",
                value: self.host.clone(),
            })
    }
}
