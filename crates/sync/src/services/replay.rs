//! Replay of queued mutations against the remote backend.
//!
//! Entries are replayed strictly in queue order. The first backend error halts
//! the pass so a later mutation never overtakes an earlier one that has not
//! landed yet. Entries that cannot be interpreted (unknown action tag,
//! malformed payload, unknown table) are skipped and left in the queue for an
//! operator to inspect or remove.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use siteline_core::{Customer, Order, Product, Project};
use tracing::{debug, info, instrument, warn};

use crate::backend::Backend;
use crate::db::{MutationQueue, QueueEntry};
use crate::entity::Entity;

/// Tables a queued mutation may target.
const KNOWN_TABLES: [&str; 4] = [Product::TABLE, Order::TABLE, Project::TABLE, Customer::TABLE];

/// Idempotency key shared by the live attempt and every replay of it.
///
/// Queue entry ids are never reused, so two mutations recorded in the same
/// millisecond still get distinct keys.
#[must_use]
pub fn idempotency_key(action: &str, timestamp: i64, entry_id: i64) -> String {
    format!("{action}:{timestamp}:{entry_id}")
}

/// Payload stored with every queued mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedMutation {
    /// Remote table.
    pub table: String,
    /// Target row id. Always set, including for creates.
    pub id: String,
    /// Row (or partial row) to send. `null` for deletes.
    #[serde(default)]
    pub row: Value,
}

impl QueuedMutation {
    #[must_use]
    pub fn new(table: &str, id: &str, row: Value) -> Self {
        Self {
            table: table.to_string(),
            id: id.to_string(),
            row,
        }
    }

    /// Encode as a queue payload.
    #[must_use]
    pub fn to_payload(&self) -> Value {
        json!({
            "table": self.table,
            "id": self.id,
            "row": self.row,
        })
    }

    fn from_entry(entry: &QueueEntry) -> Option<Self> {
        let mutation: Self = serde_json::from_value(entry.payload.clone()).ok()?;
        (KNOWN_TABLES.contains(&mutation.table.as_str()) && !mutation.id.is_empty())
            .then_some(mutation)
    }
}

/// Remote verb selected by an action tag prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verb {
    Create,
    Update,
    Delete,
}

impl Verb {
    fn from_action(action: &str) -> Option<Self> {
        if action.starts_with("create-") {
            Some(Self::Create)
        } else if action.starts_with("update-") {
            Some(Self::Update)
        } else if action.starts_with("delete-") {
            Some(Self::Delete)
        } else {
            None
        }
    }
}

/// Outcome of one replay pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReplayReport {
    /// Entries confirmed remotely and removed from the queue.
    pub applied: usize,
    /// Entries left in place because they could not be interpreted.
    pub skipped: usize,
    /// Entries still queued after the pass.
    pub remaining: usize,
    /// The backend error that stopped the pass, if any.
    pub halted: Option<String>,
}

/// Replay up to `batch` queued mutations, oldest first.
///
/// Skipped entries do not count against `batch`.
#[instrument(skip(queue, backend))]
pub async fn replay_pending<B: Backend>(
    queue: &MutationQueue,
    backend: &B,
    batch: usize,
) -> ReplayReport {
    let mut report = ReplayReport::default();
    let mut attempted = 0;

    for entry in queue.list_pending().await {
        if attempted == batch {
            break;
        }
        let Some(verb) = Verb::from_action(&entry.action) else {
            warn!(entry_id = entry.id, action = %entry.action, "Skipping queued mutation with unknown action");
            report.skipped += 1;
            continue;
        };
        let Some(mutation) = QueuedMutation::from_entry(&entry) else {
            warn!(entry_id = entry.id, action = %entry.action, "Skipping queued mutation with malformed payload");
            report.skipped += 1;
            continue;
        };

        attempted += 1;
        let key = idempotency_key(&entry.action, entry.timestamp, entry.id);
        let result = match verb {
            Verb::Create => backend
                .insert(&mutation.table, &mutation.row, &key)
                .await
                .map(drop),
            Verb::Update => backend
                .update(&mutation.table, &mutation.id, &mutation.row, &key)
                .await
                .map(drop),
            Verb::Delete => backend.delete(&mutation.table, &mutation.id, &key).await,
        };

        match result {
            Ok(()) => {
                queue.remove(entry.id).await;
                report.applied += 1;
                debug!(entry_id = entry.id, action = %entry.action, "Replayed queued mutation");
            }
            Err(e) => {
                warn!(entry_id = entry.id, action = %entry.action, error = %e, "Replay halted");
                report.halted = Some(e.to_string());
                break;
            }
        }
    }

    report.remaining = queue.len().await;
    info!(
        applied = report.applied,
        skipped = report.skipped,
        remaining = report.remaining,
        "Replay pass finished"
    );
    report
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_idempotency_key() {
        assert_eq!(
            idempotency_key("update-order-status", 1_760_000_000_000, 42),
            "update-order-status:1760000000000:42"
        );
        assert_ne!(
            idempotency_key("create-product", 7, 1),
            idempotency_key("create-product", 7, 2)
        );
    }

    #[test]
    fn test_verb_from_action() {
        assert_eq!(Verb::from_action("create-project"), Some(Verb::Create));
        assert_eq!(Verb::from_action("update-order-status"), Some(Verb::Update));
        assert_eq!(Verb::from_action("delete-customer"), Some(Verb::Delete));
        assert_eq!(Verb::from_action("archive-order"), None);
    }

    #[test]
    fn test_payload_round_trip() {
        let mutation = QueuedMutation::new("orders", "o-1", json!({"status": "shipped"}));
        let entry = QueueEntry {
            id: 1,
            action: "update-order-status".to_string(),
            payload: mutation.to_payload(),
            timestamp: 5,
        };
        assert_eq!(QueuedMutation::from_entry(&entry), Some(mutation));
    }

    #[test]
    fn test_rejects_unknown_table_and_missing_id() {
        let entry = |payload: Value| QueueEntry {
            id: 1,
            action: "delete-product".to_string(),
            payload,
            timestamp: 5,
        };
        assert!(QueuedMutation::from_entry(&entry(json!({"table": "users", "id": "u"}))).is_none());
        assert!(QueuedMutation::from_entry(&entry(json!({"table": "products", "id": ""}))).is_none());
        assert!(QueuedMutation::from_entry(&entry(json!("not an object"))).is_none());
        assert!(
            QueuedMutation::from_entry(&entry(json!({"table": "products", "id": "p-1"})))
                .is_some_and(|m| m.row.is_null())
        );
    }
}
