/// Schema migrations
///
/// Migrations live in the crate's `migrations/` directory and are
/// embedded into the binary at compile time, so a deployed Trackle
/// server migrates its own database on startup.
use sqlx::SqlitePool;

/// Apply all pending migrations.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    tracing::info!("running database migrations");

    sqlx::migrate!("./migrations").run(pool).await?;

    tracing::info!("database migrations completed");
    Ok(())
}

/// A migration recorded in the `_sqlx_migrations` bookkeeping table
#[derive(Debug, Clone)]
pub struct MigrationStatus {
    pub version: i64,
    pub description: String,
    pub success: bool,
}

/// List applied migrations. Returns an empty list when the database has
/// never been migrated.
pub async fn get_migration_status(pool: &SqlitePool) -> Result<Vec<MigrationStatus>, sqlx::Error> {
    let table_count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = '_sqlx_migrations'",
    )
    .fetch_one(pool)
    .await?;

    if table_count == 0 {
        return Ok(Vec::new());
    }

    let rows = sqlx::query_as::<_, (i64, String, bool)>(
        "SELECT version, description, success FROM _sqlx_migrations ORDER BY version",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(version, description, success)| MigrationStatus {
            version,
            description,
            success,
        })
        .collect())
}
