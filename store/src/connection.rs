//! Database connection management.
//!
//! Builds the `SQLx` connection pool the rest of the crate operates on.

use crate::error::{Result, StoreError};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;

/// Open (or create) the bid database at `path` and apply pending migrations.
///
/// # Errors
/// Returns `StoreError` if the database cannot be opened or a migration
/// fails.
pub async fn open(path: impl AsRef<Path>) -> Result<Pool<Sqlite>> {
    let path_str = path
        .as_ref()
        .to_str()
        .ok_or_else(|| StoreError::Open("database path is not valid UTF-8".to_string()))?;

    let connect_options = SqliteConnectOptions::from_str(path_str)
        .map_err(|e| StoreError::Open(format!("invalid connection string: {e}")))?
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(connect_options)
        .await
        .map_err(|e| StoreError::Open(format!("failed to create pool: {e}")))?;

    crate::migrations::run(&pool).await?;

    tracing::info!("bid store opened at {}", path_str);

    Ok(pool)
}

/// Open a migrated in-memory database. Used by tests and by deployments
/// that do not care about persistence across restarts.
///
/// The pool is capped at a single connection: an in-memory SQLite database
/// lives and dies with its connection, so a second one would see an empty
/// schema.
///
/// # Errors
/// Returns `StoreError` if pool creation or a migration fails.
pub async fn open_in_memory() -> Result<Pool<Sqlite>> {
    let connect_options = SqliteConnectOptions::from_str(":memory:")
        .map_err(|e| StoreError::Open(format!("invalid connection string: {e}")))?;

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(connect_options)
        .await
        .map_err(|e| StoreError::Open(format!("failed to create pool: {e}")))?;

    crate::migrations::run(&pool).await?;

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn open_in_memory_applies_migrations() {
        let pool = open_in_memory().await.expect("open in-memory store");

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' AND name != '_sqlx_migrations' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .expect("query tables");

        assert_eq!(tables, vec!["bids"]);
    }
}
