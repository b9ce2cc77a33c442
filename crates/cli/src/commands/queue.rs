//! Mutation queue commands.
//!
//! # Usage
//!
//! ```bash
//! # List pending mutations, oldest first
//! sl-cli queue list
//!
//! # Drop a mutation that should never be replayed
//! sl-cli queue remove 42
//!
//! # Send pending mutations to the remote backend
//! sl-cli queue replay
//! ```
//!
//! # Environment Variables
//!
//! - `SITELINE_QUEUE_PATH` - Queue database file
//! - `SITELINE_BACKEND_URL` / `SITELINE_BACKEND_KEY` - Required for `replay`

use siteline_sync::{DataAccess, MutationQueue, SyncConfig, SyncContext};
use thiserror::Error;

/// Errors that can occur during queue commands.
#[derive(Debug, Error)]
pub enum QueueCommandError {
    /// The queue database could not be opened.
    #[error("Mutation queue unavailable at {0}")]
    Unavailable(String),

    /// No entry with the given id.
    #[error("No queued mutation with id {0}")]
    NotFound(i64),

    /// Replay needs a configured backend.
    #[error("Remote backend not configured, nothing to replay against")]
    NotConfigured,

    /// Replay stopped on a backend error.
    #[error("Replay halted: {0}")]
    Halted(String),
}

async fn open(config: &SyncConfig) -> Result<MutationQueue, QueueCommandError> {
    let queue = MutationQueue::open(&config.queue_path).await;
    if queue.is_durable() {
        Ok(queue)
    } else {
        Err(QueueCommandError::Unavailable(
            config.queue_path.display().to_string(),
        ))
    }
}

/// Log every pending mutation in replay order.
///
/// # Errors
///
/// Returns `QueueCommandError` if the queue cannot be opened.
pub async fn list(config: &SyncConfig) -> Result<(), QueueCommandError> {
    let queue = open(config).await?;
    let pending = queue.list_pending().await;

    for entry in &pending {
        tracing::info!(
            id = entry.id,
            action = %entry.action,
            timestamp = entry.timestamp,
            payload = %entry.payload,
            "Pending mutation"
        );
    }
    tracing::info!(count = pending.len(), "Mutation queue listed");
    Ok(())
}

/// Remove one pending mutation.
///
/// # Errors
///
/// Returns `QueueCommandError` if the queue cannot be opened or has no entry
/// with `id`.
pub async fn remove(config: &SyncConfig, id: i64) -> Result<(), QueueCommandError> {
    let queue = open(config).await?;
    if !queue.list_pending().await.iter().any(|entry| entry.id == id) {
        return Err(QueueCommandError::NotFound(id));
    }

    queue.remove(id).await;
    tracing::info!(id, "Removed queued mutation");
    Ok(())
}

/// Replay pending mutations against the configured backend.
///
/// # Errors
///
/// Returns `QueueCommandError` if no backend is configured, the queue cannot be
/// opened, or replay stopped on a backend error.
pub async fn replay(config: &SyncConfig) -> Result<(), QueueCommandError> {
    if !config.is_live() {
        return Err(QueueCommandError::NotConfigured);
    }

    let data = DataAccess::from_config(config, SyncContext::init()).await;
    if !data.queue().is_durable() {
        return Err(QueueCommandError::Unavailable(
            config.queue_path.display().to_string(),
        ));
    }
    let report = data.replay_pending().await;

    tracing::info!(
        applied = report.applied,
        skipped = report.skipped,
        remaining = report.remaining,
        "Replay finished"
    );

    match report.halted {
        Some(reason) => Err(QueueCommandError::Halted(reason)),
        None => Ok(()),
    }
}
