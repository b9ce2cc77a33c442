//! Embedded `SQLite` storage for the mutation queue.
//!
//! # Database: one local file per installation
//!
//! ## Tables
//!
//! - `mutation_queue` - Writes attempted without remote confirmation, indexed by
//!   `timestamp` for ordered replay
//!
//! The schema is created on open; there is nothing to migrate by hand.

pub mod mutation_queue;

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use thiserror::Error;

pub use mutation_queue::{MutationQueue, QueueEntry};

/// Errors that can occur during queue storage operations.
///
/// These never leave the queue: every public queue operation degrades instead.
#[derive(Debug, Error)]
pub enum QueueError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Payload could not be encoded or decoded.
    #[error("payload serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Open (creating if missing) an on-disk queue database.
///
/// # Errors
///
/// Returns `QueueError` if the file cannot be opened or the schema cannot be
/// created.
pub async fn create_pool(path: &Path) -> Result<SqlitePool, QueueError> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(4)
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(options)
        .await?;

    init_schema(&pool).await?;
    Ok(pool)
}

/// Open a private in-memory queue database.
///
/// Every `SQLite` memory connection is its own database, so the pool is pinned to
/// a single connection that is never recycled.
///
/// # Errors
///
/// Returns `QueueError` if the connection cannot be established.
pub async fn create_memory_pool() -> Result<SqlitePool, QueueError> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?;

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    init_schema(&pool).await?;
    Ok(pool)
}

async fn init_schema(pool: &SqlitePool) -> Result<(), QueueError> {
    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS mutation_queue (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            action TEXT NOT NULL,
            payload TEXT NOT NULL,
            timestamp INTEGER NOT NULL
        )
        ",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_mutation_queue_timestamp ON mutation_queue (timestamp)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
