//! Schema migrations for the `users` table.

use sqlx::PgPool;
use tracing::info;

use usergate_core::error::{AppError, ErrorKind};

/// Applies pending files from `migrations/`; already-applied ones are skipped.
pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    let migrator = sqlx::migrate!("../../migrations");

    migrator.run(pool).await.map_err(|e| {
        AppError::with_source(ErrorKind::Storage, "User schema migration failed", e)
    })?;

    info!(known = migrator.iter().count(), "User schema up to date");
    Ok(())
}
