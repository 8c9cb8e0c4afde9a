use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbBackend, DbErr};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::config::AppConfig;
use crate::migrator::Migrator;

/// Type alias kept for readability at call sites.
pub type DbPool = DatabaseConnection;

/// Establishes a connection pool to the database.
pub async fn establish_connection(database_url: &str) -> Result<DbPool, DbErr> {
    let mut options = ConnectOptions::new(database_url.to_string());
    if database_url.contains(":memory:") {
        // Every pooled connection to an in-memory SQLite database gets its
        // own database; keep a single long-lived connection so all queries
        // see the same schema.
        options
            .max_connections(1)
            .min_connections(1)
            .sqlx_logging(false);
    } else {
        options
            .max_connections(10)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .acquire_timeout(Duration::from_secs(8))
            .sqlx_logging(false);
    }

    let pool = Database::connect(options).await?;
    info!("Database connection established");
    Ok(pool)
}

pub async fn establish_connection_from_app_config(config: &AppConfig) -> Result<DbPool, DbErr> {
    establish_connection(&config.database_url).await
}

/// Applies all pending migrations.
pub async fn run_migrations(pool: &DbPool) -> Result<(), DbErr> {
    Migrator::up(pool, None).await?;
    info!("Migrations applied");
    Ok(())
}

/// SQLite serializes writers at the file level and rejects `FOR UPDATE`;
/// transition handlers only take explicit row locks on backends that
/// support them.
pub fn supports_row_locks(backend: DbBackend) -> bool {
    !matches!(backend, DbBackend::Sqlite)
}
