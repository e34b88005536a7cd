/// Embedded schema migrations
///
/// The SQL files under `lms-shared/migrations/` are compiled into the binary
/// with `sqlx::migrate!` and applied in version order at start-up:
///
/// 1. users and the `user_role` enum
/// 2. course tree (courses, modules, chapters, sections) and assignments
/// 3. chapter progress and last-seen markers
/// 4. posts, comments and policies

use sqlx::postgres::PgPool;
use tracing::{error, info};

/// Applies every pending migration
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Running database migrations");

    sqlx::migrate!("./migrations").run(pool).await.map_err(|e| {
        error!(error = %e, "Migration failed");
        e
    })?;

    info!("Database schema is up to date");
    Ok(())
}

/// Version of the newest successfully applied migration
///
/// Returns `None` before the first migration has run.
pub async fn latest_version(pool: &PgPool) -> Result<Option<i64>, sqlx::Error> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS (
            SELECT FROM information_schema.tables
            WHERE table_schema = 'public' AND table_name = '_sqlx_migrations'
        )",
    )
    .fetch_one(pool)
    .await?;

    if !exists {
        return Ok(None);
    }

    sqlx::query_scalar("SELECT MAX(version) FROM _sqlx_migrations WHERE success = true")
        .fetch_one(pool)
        .await
}
