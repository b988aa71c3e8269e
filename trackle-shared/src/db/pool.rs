/// Database connection pool management
///
/// Trackle stores its data in a single SQLite database file. The pool is
/// created once at startup, shared through the application state, and
/// closed on shutdown.
///
/// # Example
///
/// ```no_run
/// use trackle_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), sqlx::Error> {
/// let config = DatabaseConfig {
///     url: "sqlite://trackle.db".to_string(),
///     ..Default::default()
/// };
/// let pool = create_pool(config).await?;
/// # Ok(())
/// # }
/// ```
///
/// For an in-memory database (`sqlite::memory:`) keep `max_connections`
/// at 1: every SQLite connection to `:memory:` opens its own private
/// database, so a larger pool would hand out empty databases.
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

/// Database pool configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// SQLite connection URL, e.g. `sqlite://trackle.db`
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of idle connections to maintain
    pub min_connections: u32,
    /// Timeout for acquiring a connection from the pool
    pub connect_timeout_seconds: u64,
    /// How long a connection may sit idle before being closed
    pub idle_timeout_seconds: u64,
    /// Maximum lifetime of a single connection
    pub max_lifetime_seconds: u64,
    /// Verify connections are alive before handing them out
    pub test_before_acquire: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://trackle.db".to_string(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout_seconds: 30,
            idle_timeout_seconds: 600,
            max_lifetime_seconds: 1800,
            test_before_acquire: true,
        }
    }
}

/// Create a connection pool and verify it with a health check.
///
/// The database file is created if it does not exist yet.
pub async fn create_pool(config: DatabaseConfig) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
        .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
        .max_lifetime(Duration::from_secs(config.max_lifetime_seconds))
        .test_before_acquire(config.test_before_acquire)
        .connect_with(options)
        .await?;

    health_check(&pool).await?;

    tracing::info!(
        url = %config.url,
        max_connections = config.max_connections,
        "database pool created"
    );

    Ok(pool)
}

/// Run a trivial query to confirm the database is reachable.
pub async fn health_check(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query_as::<_, (i32,)>("SELECT 1").fetch_one(pool).await?;
    Ok(())
}

/// Point-in-time pool statistics
#[derive(Debug, Clone)]
pub struct PoolStats {
    pub size: u32,
    pub num_idle: usize,
}

pub fn get_pool_stats(pool: &SqlitePool) -> PoolStats {
    PoolStats {
        size: pool.size(),
        num_idle: pool.num_idle(),
    }
}

/// Close the pool, waiting for in-flight connections to finish.
pub async fn close_pool(pool: SqlitePool) {
    pool.close().await;
    tracing::info!("database pool closed");
}
