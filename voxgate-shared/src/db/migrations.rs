/// Database migration runner
///
/// Thin wrapper around sqlx's embedded migration system. Migration files
/// live in the `migrations/` directory at the workspace root and are
/// compiled into the binary, so deployments never depend on loose SQL
/// files being present on disk.
///
/// Migrations are forward-only: each file is named
/// `{version}_{description}.sql` and is applied at most once, in order.
///
/// # Example
///
/// ```no_run
/// use voxgate_shared::db::pool::{create_pool, DatabaseConfig};
/// use voxgate_shared::db::migrations::{run_migrations, get_migration_status};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = DatabaseConfig {
///         url: std::env::var("DATABASE_URL")?,
///         ..Default::default()
///     };
///
///     let pool = create_pool(config).await?;
///     run_migrations(&pool).await?;
///
///     let status = get_migration_status(&pool).await?;
///     println!("Applied {} migrations", status.applied_migrations);
///
///     Ok(())
/// }
/// ```

use sqlx::{migrate::MigrateDatabase, postgres::PgPool, Postgres};
use tracing::{debug, info, warn};

/// Migration status information
#[derive(Debug, Clone)]
pub struct MigrationStatus {
    /// Number of migrations that have been applied successfully
    pub applied_migrations: usize,

    /// Version of the most recently applied migration
    pub latest_version: Option<i64>,
}

/// Runs all pending database migrations
///
/// Creates the `_sqlx_migrations` bookkeeping table if needed, then applies
/// every migration that has not run yet. Each migration runs in its own
/// transaction, so a failure rolls back cleanly and is returned as an error.
///
/// # Errors
///
/// Returns an error if a migration fails to execute, a previously applied
/// migration has been modified, or the connection is lost mid-run.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Starting database migrations");

    let migrations = sqlx::migrate!("../migrations");

    match migrations.run(pool).await {
        Ok(()) => {
            info!("All database migrations completed successfully");
            Ok(())
        }
        Err(e) => {
            warn!("Migration failed: {}", e);
            Err(e)
        }
    }
}

/// Reports which migrations have been applied
///
/// Used by the readiness probe: a database that is reachable but has never
/// been migrated is not ready to serve traffic.
///
/// # Errors
///
/// Returns an error if the bookkeeping table cannot be queried.
pub async fn get_migration_status(pool: &PgPool) -> Result<MigrationStatus, sqlx::Error> {
    debug!("Checking migration status");

    let table_exists: bool = sqlx::query_scalar(
        "SELECT EXISTS (
            SELECT FROM information_schema.tables
            WHERE table_schema = 'public'
            AND table_name = '_sqlx_migrations'
        )",
    )
    .fetch_one(pool)
    .await?;

    if !table_exists {
        debug!("Migrations table does not exist yet");
        return Ok(MigrationStatus {
            applied_migrations: 0,
            latest_version: None,
        });
    }

    let (count, latest_version): (i64, Option<i64>) = sqlx::query_as(
        "SELECT
            COUNT(*) as count,
            MAX(version) as latest_version
         FROM _sqlx_migrations
         WHERE success = true",
    )
    .fetch_one(pool)
    .await?;

    debug!(
        applied_migrations = count,
        latest_version = ?latest_version,
        "Migration status retrieved"
    );

    Ok(MigrationStatus {
        applied_migrations: count as usize,
        latest_version,
    })
}

/// Creates the database if it doesn't exist
///
/// Intended for development and test setups. Production databases should
/// be provisioned out of band.
///
/// # Errors
///
/// Returns an error if the server cannot be reached or the connected role
/// lacks CREATEDB.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), sqlx::Error> {
    info!("Checking if database exists");

    if !Postgres::database_exists(database_url).await? {
        info!("Database does not exist, creating it");
        Postgres::create_database(database_url).await?;
        info!("Database created successfully");
    } else {
        debug!("Database already exists");
    }

    Ok(())
}

/// Drops the database and all of its data
///
/// # Safety
///
/// This permanently deletes every row. It exists for test teardown only;
/// never point it at a production URL.
///
/// # Errors
///
/// Returns an error if the server cannot be reached, the role lacks
/// permission, or other sessions are still connected.
pub async fn drop_database(database_url: &str) -> Result<(), sqlx::Error> {
    warn!("DROPPING DATABASE: {}", database_url);

    if Postgres::database_exists(database_url).await? {
        Postgres::drop_database(database_url).await?;
        info!("Database dropped successfully");
    } else {
        debug!("Database does not exist, nothing to drop");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migration_status_clone() {
        let status = MigrationStatus {
            applied_migrations: 2,
            latest_version: Some(2),
        };

        let cloned = status.clone();
        assert_eq!(status.applied_migrations, cloned.applied_migrations);
        assert_eq!(status.latest_version, cloned.latest_version);
    }

    // Applying migrations against a live database is covered by the
    // integration tests in tests/.
}
