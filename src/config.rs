//! Database configuration loaded from the environment.
//!
//! An optional `.env` file in the working directory is loaded first;
//! variables already set in the process environment take precedence.

use crate::wallet::adapters::postgres::PgPool;
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool, PoolError};
use std::time::Duration;
use thiserror::Error;

/// Connection string variable. Required.
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";
/// Maximum pool size variable.
pub const POOL_SIZE_VAR: &str = "DATABASE_POOL_SIZE";
/// Connection checkout timeout variable, in seconds.
pub const CONNECT_TIMEOUT_VAR: &str = "DATABASE_CONNECT_TIMEOUT_SECS";

const DEFAULT_POOL_SIZE: u32 = 8;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Errors raised while loading configuration or opening the pool.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is not set.
    #[error("missing environment variable {0}")]
    Missing(&'static str),

    /// A variable is set to an unusable value.
    #[error("invalid value '{value}' for {key}")]
    Invalid {
        /// Variable name.
        key: &'static str,
        /// Rejected value.
        value: String,
    },

    /// The `.env` file exists but could not be read.
    #[error("failed to load .env file: {0}")]
    DotEnv(#[from] dotenvy::Error),

    /// The connection pool could not be built.
    #[error("failed to build connection pool: {0}")]
    Pool(#[from] PoolError),
}

/// `PostgreSQL` connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Connection string.
    pub url: String,
    /// Maximum number of pooled connections.
    pub pool_size: u32,
    /// How long to wait for a pooled connection.
    pub connect_timeout: Duration,
}

impl DatabaseConfig {
    /// Loads settings from the process environment and `.env`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] without a connection string,
    /// [`ConfigError::Invalid`] for malformed numbers, or
    /// [`ConfigError::DotEnv`] when `.env` exists but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            return Err(err.into());
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads settings through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// See [`Self::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let url = lookup(DATABASE_URL_VAR)
            .filter(|value| !value.trim().is_empty())
            .ok_or(ConfigError::Missing(DATABASE_URL_VAR))?;
        let pool_size = parse_var(&lookup, POOL_SIZE_VAR, DEFAULT_POOL_SIZE)?;
        if pool_size == 0 {
            return Err(ConfigError::Invalid {
                key: POOL_SIZE_VAR,
                value: pool_size.to_string(),
            });
        }
        let timeout_secs = parse_var(&lookup, CONNECT_TIMEOUT_VAR, DEFAULT_CONNECT_TIMEOUT_SECS)?;
        Ok(Self {
            url,
            pool_size,
            connect_timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Builds a connection pool for these settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Pool`] when the initial connections cannot be
    /// established within the timeout.
    pub fn build_pool(&self) -> Result<PgPool, ConfigError> {
        let manager = ConnectionManager::<PgConnection>::new(&self.url);
        Ok(Pool::builder()
            .max_size(self.pool_size)
            .connection_timeout(self.connect_timeout)
            .build(manager)?)
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    lookup(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw })
    })
}
