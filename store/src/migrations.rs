//! Embedded schema migrations.

use crate::error::{Result, StoreError};
use sqlx::{Pool, Sqlite};

/// Apply all pending migrations from the `migrations/` directory.
///
/// Applied migrations are tracked by `SQLx` in a `_sqlx_migrations` table,
/// so running this repeatedly is a no-op after the first call.
///
/// # Errors
/// Returns `StoreError::Migration` if any migration fails to execute.
pub async fn run(pool: &Pool<Sqlite>) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| StoreError::Migration(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let pool = crate::connection::open_in_memory()
            .await
            .expect("open store");

        // open() already migrated once; a second run must not fail
        run(&pool).await.expect("re-run migrations");
    }
}
