//! Database configuration loaded from environment variables.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `DATABASE_URL` | required |
//! | `DB_MAX_CONNECTIONS` | 10 |
//! | `DB_MIN_CONNECTIONS` | 1 |
//! | `DB_CONNECT_TIMEOUT_SECS` | 30 |

use std::str::FromStr;
use std::time::Duration;

use tracing::debug;

use bo_core::defaults::{DB_CONNECT_TIMEOUT_SECS, DB_IDLE_TIMEOUT_SECS, DB_MAX_CONNECTIONS};
use bo_core::{Error, Result};

pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_MAX_CONNECTIONS: &str = "DB_MAX_CONNECTIONS";
pub const ENV_MIN_CONNECTIONS: &str = "DB_MIN_CONNECTIONS";
pub const ENV_CONNECT_TIMEOUT_SECS: &str = "DB_CONNECT_TIMEOUT_SECS";

/// Pool sizing and timeouts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    /// How long an acquire waits for a free connection.
    pub connect_timeout: Duration,
    pub idle_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: DB_MAX_CONNECTIONS,
            min_connections: 1,
            connect_timeout: Duration::from_secs(DB_CONNECT_TIMEOUT_SECS),
            idle_timeout: Duration::from_secs(DB_IDLE_TIMEOUT_SECS),
        }
    }
}

impl PoolConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_connections(mut self, n: u32) -> Self {
        self.max_connections = n;
        self
    }

    pub fn min_connections(mut self, n: u32) -> Self {
        self.min_connections = n;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

/// Connection settings for the case search database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub database_url: String,
    pub pool: PoolConfig,
}

impl DatabaseConfig {
    /// Settings for `database_url` with the default pool.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            pool: PoolConfig::default(),
        }
    }

    pub fn with_pool(mut self, pool: PoolConfig) -> Self {
        self.pool = pool;
        self
    }

    /// Load from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup(ENV_DATABASE_URL)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| Error::Config(format!("{} is not set", ENV_DATABASE_URL)))?;

        let mut pool = PoolConfig::default();
        if let Some(n) = parse_var::<u32, _>(&lookup, ENV_MAX_CONNECTIONS)? {
            pool = pool.max_connections(n);
        }
        if let Some(n) = parse_var::<u32, _>(&lookup, ENV_MIN_CONNECTIONS)? {
            pool = pool.min_connections(n);
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, ENV_CONNECT_TIMEOUT_SECS)? {
            pool = pool.connect_timeout(Duration::from_secs(secs));
        }

        if pool.min_connections > pool.max_connections {
            return Err(Error::Config(format!(
                "{} ({}) exceeds {} ({})",
                ENV_MIN_CONNECTIONS, pool.min_connections, ENV_MAX_CONNECTIONS, pool.max_connections
            )));
        }

        debug!(
            subsystem = "database",
            component = "config",
            max_connections = pool.max_connections,
            min_connections = pool.min_connections,
            "Loaded database configuration"
        );

        Ok(Self { database_url, pool })
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| Error::Config(format!("invalid {} '{}': {}", key, raw, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_with_url_only() {
        let config =
            DatabaseConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/bo")]))
                .unwrap();
        assert_eq!(config.database_url, "postgres://localhost/bo");
        assert_eq!(config.pool, PoolConfig::default());
    }

    #[test]
    fn test_missing_url_is_config_error() {
        let err = DatabaseConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let blank = DatabaseConfig::from_lookup(lookup(&[("DATABASE_URL", "  ")]));
        assert!(blank.is_err());
    }

    #[test]
    fn test_pool_overrides() {
        let config = DatabaseConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/bo"),
            ("DB_MAX_CONNECTIONS", "4"),
            ("DB_MIN_CONNECTIONS", "2"),
            ("DB_CONNECT_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();
        assert_eq!(config.pool.max_connections, 4);
        assert_eq!(config.pool.min_connections, 2);
        assert_eq!(config.pool.connect_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_number_is_config_error() {
        let err = DatabaseConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/bo"),
            ("DB_MAX_CONNECTIONS", "many"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("DB_MAX_CONNECTIONS"));
    }

    #[test]
    fn test_pool_config_builder() {
        let pool = PoolConfig::new()
            .max_connections(20)
            .min_connections(5)
            .connect_timeout(Duration::from_secs(60));
        let config = DatabaseConfig::new("postgres://localhost/bo").with_pool(pool.clone());

        assert_eq!(config.pool, pool);
        assert_eq!(config.pool.max_connections, 20);
        assert_eq!(config.pool.idle_timeout, Duration::from_secs(600));
    }

    #[test]
    fn test_min_above_max_rejected() {
        let err = DatabaseConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/bo"),
            ("DB_MAX_CONNECTIONS", "2"),
            ("DB_MIN_CONNECTIONS", "3"),
        ]));
        assert!(matches!(err, Err(Error::Config(_))));
    }
}
