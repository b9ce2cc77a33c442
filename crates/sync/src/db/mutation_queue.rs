//! Durable queue of mutations awaiting remote confirmation.
//!
//! The queue never fails its callers. If the database cannot be opened the
//! failure is logged once and the instance becomes a stateless stub for the rest
//! of the session: `enqueue` does nothing, `list_pending` is empty, `remove` is a
//! no-op. Opening is never retried. Callers therefore cannot assume a queued
//! write survived; `is_durable` tells them whether it could have.

use std::path::Path;

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use sqlx::SqlitePool;
use tracing::{debug, error, warn};

use super::{QueueError, create_memory_pool, create_pool};

/// A pending, not-yet-confirmed mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueEntry {
    /// Store-assigned, monotonically increasing id.
    pub id: i64,
    /// Which domain operation was attempted (e.g. "update-order-status").
    pub action: String,
    /// Arguments needed to replay the action.
    pub payload: Value,
    /// Creation time in Unix milliseconds; the replay ordering key.
    pub timestamp: i64,
}

#[derive(sqlx::FromRow)]
struct QueueRow {
    id: i64,
    action: String,
    payload: String,
    timestamp: i64,
}

impl From<QueueRow> for QueueEntry {
    fn from(row: QueueRow) -> Self {
        let payload = serde_json::from_str(&row.payload).unwrap_or_else(|e| {
            warn!(entry_id = row.id, error = %e, "Queued payload is not valid JSON");
            Value::Null
        });
        Self {
            id: row.id,
            action: row.action,
            payload,
            timestamp: row.timestamp,
        }
    }
}

/// Mutation queue over an embedded `SQLite` store.
#[derive(Debug, Clone)]
pub struct MutationQueue {
    pool: Option<SqlitePool>,
}

impl MutationQueue {
    /// Open the queue stored at `path`, degrading to a stub on failure.
    pub async fn open(path: &Path) -> Self {
        match create_pool(path).await {
            Ok(pool) => {
                debug!(path = %path.display(), "Mutation queue opened");
                Self { pool: Some(pool) }
            }
            Err(e) => Self::degraded(&e),
        }
    }

    /// Open a private in-memory queue (durable for the process lifetime only).
    pub async fn open_in_memory() -> Self {
        match create_memory_pool().await {
            Ok(pool) => Self { pool: Some(pool) },
            Err(e) => Self::degraded(&e),
        }
    }

    /// A queue that records nothing.
    #[must_use]
    pub const fn disabled() -> Self {
        Self { pool: None }
    }

    fn degraded(e: &QueueError) -> Self {
        error!(error = %e, "Failed to open mutation queue, queued writes will not be kept");
        Self::disabled()
    }

    /// Whether entries are actually being stored.
    #[must_use]
    pub const fn is_durable(&self) -> bool {
        self.pool.is_some()
    }

    /// Append an entry stamped with the current time.
    ///
    /// Returns the new entry id, or `None` if nothing was stored.
    pub async fn enqueue(&self, action: &str, payload: Value) -> Option<i64> {
        self.enqueue_at(action, payload, Utc::now().timestamp_millis())
            .await
    }

    /// Append an entry with an explicit timestamp (Unix milliseconds).
    pub async fn enqueue_at(&self, action: &str, payload: Value, timestamp: i64) -> Option<i64> {
        let pool = self.pool.as_ref()?;
        match insert(pool, action, &payload, timestamp).await {
            Ok(id) => {
                debug!(entry_id = id, action, "Queued mutation");
                Some(id)
            }
            Err(e) => {
                warn!(error = %e, action, "Failed to queue mutation");
                None
            }
        }
    }

    /// All entries, oldest first (ties broken by id).
    pub async fn list_pending(&self) -> Vec<QueueEntry> {
        let Some(pool) = self.pool.as_ref() else {
            return Vec::new();
        };

        let rows = sqlx::query_as::<_, QueueRow>(
            r"
            SELECT id, action, payload, timestamp
            FROM mutation_queue
            ORDER BY timestamp ASC, id ASC
            ",
        )
        .fetch_all(pool)
        .await;

        match rows {
            Ok(rows) => rows.into_iter().map(QueueEntry::from).collect(),
            Err(e) => {
                warn!(error = %e, "Failed to read mutation queue");
                Vec::new()
            }
        }
    }

    /// Delete one entry. Absent ids are ignored.
    pub async fn remove(&self, id: i64) {
        let Some(pool) = self.pool.as_ref() else {
            return;
        };

        if let Err(e) = sqlx::query("DELETE FROM mutation_queue WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await
        {
            warn!(error = %e, entry_id = id, "Failed to remove queued mutation");
        }
    }

    /// Number of stored entries (zero for a stub).
    pub async fn len(&self) -> usize {
        let Some(pool) = self.pool.as_ref() else {
            return 0;
        };

        match sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM mutation_queue")
            .fetch_one(pool)
            .await
        {
            Ok(count) => usize::try_from(count).unwrap_or(0),
            Err(e) => {
                warn!(error = %e, "Failed to count mutation queue");
                0
            }
        }
    }

    /// Whether there is nothing to replay.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

async fn insert(
    pool: &SqlitePool,
    action: &str,
    payload: &Value,
    timestamp: i64,
) -> Result<i64, QueueError> {
    let encoded = serde_json::to_string(payload)?;
    let result =
        sqlx::query("INSERT INTO mutation_queue (action, payload, timestamp) VALUES (?, ?, ?)")
            .bind(action)
            .bind(encoded)
            .bind(timestamp)
            .execute(pool)
            .await?;

    Ok(result.last_insert_rowid())
}
