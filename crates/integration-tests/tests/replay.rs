//! Integration tests for replaying queued mutations.

#![allow(clippy::unwrap_used)]

use serde_json::json;
use siteline_core::{Customer, OrderStatus, Project};
use siteline_integration_tests::{EventRecorder, StubBackend, live_facade, offline_facade};
use siteline_sync::services::replay::QueuedMutation;
use siteline_sync::services::{idempotency_key, replay_pending};
use siteline_sync::{Backend, DATA_CHANGED, MutationQueue};

#[tokio::test]
async fn test_replay_after_outage_uses_original_keys() {
    let backend = StubBackend::new().with_rows("orders", vec![json!({"id": "o-1"})]);
    backend.fail_writes(true);
    let data = live_facade(backend.clone()).await;

    data.create_project(Project {
        name: "Boat ramp".to_string(),
        ..Project::default()
    })
    .await;
    data.update_order_status("o-1", OrderStatus::Processing).await;
    data.delete_customer("cust-002").await;

    let pending = data.queue().list_pending().await;
    assert_eq!(pending.len(), 3);
    let failed_keys: Vec<String> = backend
        .writes()
        .into_iter()
        .filter_map(|call| call.idempotency_key)
        .collect();

    backend.fail_writes(false);
    let recorder = EventRecorder::attach(data.context().bus(), &[DATA_CHANGED]);
    let report = data.replay_pending().await;

    assert_eq!(report.applied, 3);
    assert_eq!(report.remaining, 0);
    assert_eq!(report.halted, None);
    assert_eq!(recorder.count(DATA_CHANGED), 1);

    let replayed_keys: Vec<String> = backend
        .writes()
        .into_iter()
        .skip(3)
        .filter_map(|call| call.idempotency_key)
        .collect();
    assert_eq!(replayed_keys, failed_keys);
    assert_eq!(backend.rows("projects").len(), 1);
    assert_eq!(backend.rows("orders")[0]["status"], "processing");
}

#[tokio::test]
async fn test_replay_halts_at_first_failure() {
    let queue = MutationQueue::open_in_memory().await;
    for (ts, id) in [(1, "c-1"), (2, "c-2"), (3, "c-3")] {
        let row = json!({"id": id, "name": id});
        queue
            .enqueue_at(
                "create-customer",
                QueuedMutation::new("customers", id, row).to_payload(),
                ts,
            )
            .await;
    }

    let backend = StubBackend::new();
    backend.fail_id("c-2");
    let report = replay_pending(&queue, &backend, 100).await;

    assert_eq!(report.applied, 1);
    assert_eq!(report.remaining, 2);
    assert!(report.halted.is_some());
    // c-3 must not overtake c-2
    assert_eq!(backend.rows("customers").len(), 1);

    backend.heal_id("c-2");
    let report = replay_pending(&queue, &backend, 100).await;
    assert_eq!(report.applied, 2);
    assert!(queue.is_empty().await);

    let names: Vec<String> = backend
        .rows("customers")
        .iter()
        .map(|row| row["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["c-1", "c-2", "c-3"]);
}

#[tokio::test]
async fn test_uninterpretable_entries_are_skipped_and_kept() {
    let queue = MutationQueue::open_in_memory().await;
    queue.enqueue_at("archive-order", json!({"table": "orders", "id": "o-1"}), 1).await;
    queue.enqueue_at("delete-order", json!({"id": "o-1"}), 2).await;
    queue
        .enqueue_at(
            "delete-order",
            QueuedMutation::new("orders", "o-2", json!(null)).to_payload(),
            3,
        )
        .await;

    let backend = StubBackend::new();
    let report = replay_pending(&queue, &backend, 100).await;

    assert_eq!(report.applied, 1);
    assert_eq!(report.skipped, 2);
    assert_eq!(report.remaining, 2);
    assert_eq!(backend.writes().len(), 1);
}

#[tokio::test]
async fn test_batch_limits_a_pass() {
    let queue = MutationQueue::open_in_memory().await;
    for ts in 0..5 {
        let id = format!("c-{ts}");
        queue
            .enqueue_at(
                "delete-customer",
                QueuedMutation::new("customers", &id, json!(null)).to_payload(),
                ts,
            )
            .await;
    }

    let report = replay_pending(&queue, &StubBackend::new(), 2).await;
    assert_eq!(report.applied, 2);
    assert_eq!(report.remaining, 3);
}

#[tokio::test]
async fn test_skipped_entries_do_not_fill_the_batch() {
    let queue = MutationQueue::open_in_memory().await;
    queue.enqueue_at("archive-order", json!({"table": "orders", "id": "o-1"}), 1).await;
    queue.enqueue_at("archive-order", json!({"table": "orders", "id": "o-2"}), 2).await;
    queue
        .enqueue_at(
            "delete-order",
            QueuedMutation::new("orders", "o-3", json!(null)).to_payload(),
            3,
        )
        .await;

    let backend = StubBackend::new();
    let report = replay_pending(&queue, &backend, 2).await;

    assert_eq!(report.applied, 1);
    assert_eq!(report.skipped, 2);
    assert_eq!(report.remaining, 2);
    assert_eq!(backend.writes().len(), 1);
}

#[tokio::test]
async fn test_replayed_create_is_not_duplicated() {
    let backend = StubBackend::new();
    let queue = MutationQueue::open_in_memory().await;
    let row = json!({"id": "c-9"});
    let entry_id = queue
        .enqueue_at(
            "create-customer",
            QueuedMutation::new("customers", "c-9", row.clone()).to_payload(),
            50,
        )
        .await
        .unwrap();

    // The live attempt landed but the process stopped before the entry was removed
    backend
        .insert("customers", &row, &idempotency_key("create-customer", 50, entry_id))
        .await
        .unwrap();

    let report = replay_pending(&queue, &backend, 100).await;
    assert_eq!(report.applied, 1);
    assert!(queue.is_empty().await);
    assert_eq!(backend.rows("customers").len(), 1);
}

#[tokio::test]
async fn test_same_millisecond_entries_are_all_applied() {
    let backend = StubBackend::new();
    let queue = MutationQueue::open_in_memory().await;
    for id in ["c-1", "c-2", "c-3"] {
        queue
            .enqueue_at(
                "create-customer",
                QueuedMutation::new("customers", id, json!({"id": id})).to_payload(),
                50,
            )
            .await;
    }

    let report = replay_pending(&queue, &backend, 100).await;
    assert_eq!(report.applied, 3);
    assert_eq!(backend.rows("customers").len(), 3);
}

#[tokio::test]
async fn test_offline_facade_does_not_replay() {
    let data = offline_facade().await;
    data.create_customer(Customer::default()).await;

    let recorder = EventRecorder::attach(data.context().bus(), &[DATA_CHANGED]);
    let report = data.replay_pending().await;

    assert_eq!(report.applied, 0);
    assert_eq!(report.remaining, 1);
    assert!(recorder.events().is_empty());
}
