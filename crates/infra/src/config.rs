//! Environment-driven configuration.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::sqlite_store::default_db_path;

pub const API_URL_VAR: &str = "ROCKETSHOES_API_URL";
pub const CART_DB_VAR: &str = "ROCKETSHOES_CART_DB";
pub const HTTP_TIMEOUT_VAR: &str = "ROCKETSHOES_HTTP_TIMEOUT_SECS";

pub const DEFAULT_API_URL: &str = "http://localhost:3333";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} must be a whole number of seconds, got {value:?}")]
    InvalidTimeout { var: &'static str, value: String },
    #[error("no cart database path: set ROCKETSHOES_CART_DB ({0})")]
    NoDataDir(String),
}

/// Settings for the catalog client and the durable cart store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartConfig {
    pub api_url: String,
    pub db_path: PathBuf,
    pub http_timeout: Option<Duration>,
}

impl CartConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Like [`CartConfig::from_env`], but with a database path chosen by the
    /// caller. `ROCKETSHOES_CART_DB` and the data directory are not consulted.
    pub fn from_env_with_db(db_path: PathBuf) -> Result<Self, ConfigError> {
        Self::resolve(|var| std::env::var(var).ok(), Some(db_path))
    }

    /// Read configuration through `lookup`, falling back to defaults for
    /// unset variables.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::resolve(lookup, None)
    }

    fn resolve<F>(lookup: F, db_path: Option<PathBuf>) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup(API_URL_VAR).unwrap_or_else(|| {
            tracing::info!("{API_URL_VAR} not set; using {DEFAULT_API_URL}");
            DEFAULT_API_URL.to_string()
        });

        let db_path = match db_path.or_else(|| lookup(CART_DB_VAR).map(PathBuf::from)) {
            Some(path) => path,
            None => default_db_path().map_err(|e| ConfigError::NoDataDir(format!("{e:#}")))?,
        };

        let http_timeout = match lookup(HTTP_TIMEOUT_VAR) {
            Some(value) => {
                let secs = value
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidTimeout {
                        var: HTTP_TIMEOUT_VAR,
                        value: value.clone(),
                    })?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        Ok(Self {
            api_url,
            db_path,
            http_timeout,
        })
    }
}
