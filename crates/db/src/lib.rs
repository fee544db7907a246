//! Database access layer: pool construction, migrations, models, and
//! repositories.
//!
//! Repositories are zero-sized structs with async methods. Reads take a
//! `&PgPool`; writes that participate in multi-statement transactions take
//! any `PgExecutor` so callers can pass either the pool or an open
//! transaction.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

pub mod models;
pub mod repositories;

/// Alias used across crates for the shared connection pool.
pub type DbPool = PgPool;

/// Connect to Postgres with sane pool limits.
pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await?;
    tracing::debug!("database pool created");
    Ok(pool)
}

/// Cheap liveness probe used at startup and by the health endpoint.
pub async fn health_check(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply any pending migrations from the workspace `migrations/` directory.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    tracing::info!("database migrations applied");
    Ok(())
}
