//! Connection pool for the case search database.

use std::time::Instant;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use bo_core::{Error, Result};

use crate::config::{DatabaseConfig, PoolConfig};

/// Pool options for `pool`, without connecting.
pub fn pool_options(pool: &PoolConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(pool.max_connections)
        .min_connections(pool.min_connections)
        .acquire_timeout(pool.connect_timeout)
        .idle_timeout(pool.idle_timeout)
}

/// Connect to `database_url` with the default pool settings.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    create_pool_with_config(&DatabaseConfig::new(database_url)).await
}

/// Connect using settings from [`DatabaseConfig`], typically
/// [`DatabaseConfig::from_env`].
pub async fn create_pool_with_config(config: &DatabaseConfig) -> Result<PgPool> {
    let start = Instant::now();

    info!(
        subsystem = "database",
        component = "pool",
        op = "create",
        max_connections = config.pool.max_connections,
        min_connections = config.pool.min_connections,
        connect_timeout_secs = config.pool.connect_timeout.as_secs(),
        "Creating case search connection pool"
    );

    let pool = pool_options(&config.pool)
        .connect(&config.database_url)
        .await
        .map_err(Error::Database)?;

    info!(
        subsystem = "database",
        component = "pool",
        op = "established",
        pool_size = pool.size(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Case search connection pool established"
    );
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_pool_options_follow_config() {
        let options = pool_options(
            &PoolConfig::new()
                .max_connections(4)
                .min_connections(2)
                .connect_timeout(Duration::from_secs(5)),
        );

        assert_eq!(options.get_max_connections(), 4);
        assert_eq!(options.get_min_connections(), 2);
        assert_eq!(options.get_acquire_timeout(), Duration::from_secs(5));
        assert_eq!(options.get_idle_timeout(), Some(Duration::from_secs(600)));
    }

    #[tokio::test]
    async fn test_unreachable_database_is_database_error() {
        let config = DatabaseConfig::new("postgres://bo:bo@127.0.0.1:1/bo").with_pool(
            PoolConfig::new()
                .min_connections(0)
                .connect_timeout(Duration::from_millis(200)),
        );

        let err = create_pool_with_config(&config).await.unwrap_err();
        assert!(matches!(err, Error::Database(_)));
    }
}
