/// Schema migrations
///
/// Migration files live in `migrations/` at the workspace root and are
/// embedded into the binary at compile time.
///
/// # Example
///
/// ```no_run
/// use moviehub_shared::db::migrations::{ensure_database_exists, run_migrations};
/// use moviehub_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example(url: String) -> Result<(), Box<dyn std::error::Error>> {
/// ensure_database_exists(&url).await?;
/// let pool = create_pool(DatabaseConfig { url, ..Default::default() }).await?;
/// run_migrations(&pool).await?;
/// # Ok(())
/// # }
/// ```

use sqlx::{migrate::MigrateDatabase, postgres::PgPool, Postgres};
use tracing::{debug, error, info};

/// Applies all pending migrations
///
/// # Errors
///
/// Returns an error if a migration fails; that migration is rolled back.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    let migrator = sqlx::migrate!("../migrations");
    info!(available = migrator.iter().count(), "Running database migrations");

    migrator
        .run(pool)
        .await
        .inspect_err(|e| error!(error = %e, "Migration failed"))?;

    info!("Database schema is up to date");
    Ok(())
}

/// Number of successfully applied migrations
pub async fn applied_migrations(pool: &PgPool) -> Result<i64, sqlx::Error> {
    let table_exists: bool = sqlx::query_scalar(
        "SELECT EXISTS (
            SELECT FROM information_schema.tables
            WHERE table_schema = 'public' AND table_name = '_sqlx_migrations'
        )",
    )
    .fetch_one(pool)
    .await?;

    if !table_exists {
        debug!("Migrations table does not exist yet");
        return Ok(0);
    }

    sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = true")
        .fetch_one(pool)
        .await
}

/// Creates the database if it doesn't exist (development convenience)
pub async fn ensure_database_exists(database_url: &str) -> Result<(), sqlx::Error> {
    if !Postgres::database_exists(database_url).await? {
        info!("Database does not exist, creating it");
        Postgres::create_database(database_url).await?;
    } else {
        debug!("Database already exists");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_migrations_are_embedded_in_order() {
        let migrator = sqlx::migrate!("../migrations");
        let versions: Vec<i64> = migrator.iter().map(|m| m.version).collect();

        assert_eq!(versions.len(), 4);
        assert!(versions.windows(2).all(|w| w[0] < w[1]));
    }
}
