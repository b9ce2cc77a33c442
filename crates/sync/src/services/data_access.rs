//! The data access facade.
//!
//! The single read/write surface used by the dashboard. Every operation is
//! routed to the remote backend when one is configured and to the synthetic
//! dataset otherwise, and nothing here returns an error: callers always get
//! usable data (possibly synthetic) or an explicit "not found".
//!
//! # Reads
//!
//! Remote first. A failed remote read or one that returns zero rows falls back
//! to the synthetic collection for that entity.
//!
//! # Writes
//!
//! Remote path:
//! 1. Record the mutation in the queue with timestamp `t`
//! 2. Send it with idempotency key `"{action}:{t}"`
//! 3. On success remove the queue entry; on failure keep it for replay and
//!    apply the mutation to the synthetic dataset so the dashboard reflects it
//!
//! Local path: record the mutation when offline writes are queued, then apply
//! it to the synthetic dataset.
//!
//! Every successful write emits the entity's change topic exactly once before
//! returning.

use serde_json::{Value, json};
use siteline_core::{Customer, Order, OrderStatus, Product, Project, UNKNOWN_ID};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::backend::{Backend, RestBackend};
use crate::config::SyncConfig;
use crate::dataset::SyntheticDataset;
use crate::db::MutationQueue;
use crate::entity::Entity;
use crate::error::FetchOutcome;
use crate::events::DATA_CHANGED;
use crate::state::SyncContext;

use super::replay::{self, QueuedMutation, ReplayReport, idempotency_key};

const DEFAULT_REPLAY_BATCH: usize = 100;

/// Generates the per-entity accessors over the generic verbs.
macro_rules! entity_accessors {
    ($ty:ty, $get:ident, $create:ident, $update:ident, $delete:ident) => {
        #[doc = concat!("Every `", stringify!($ty), "`.")]
        pub async fn $get(&self) -> Vec<$ty> {
            self.list::<$ty>().await
        }

        #[doc = concat!("Create a `", stringify!($ty), "`.")]
        pub async fn $create(&self, entity: $ty) -> $ty {
            self.create(entity).await
        }

        #[doc = concat!("Replace the `", stringify!($ty), "` with `id`.")]
        pub async fn $update(&self, id: &str, entity: $ty) -> Option<$ty> {
            self.update(id, entity).await
        }

        #[doc = concat!("Delete the `", stringify!($ty), "` with `id`.")]
        pub async fn $delete(&self, id: &str) -> bool {
            self.delete::<$ty>(id).await
        }
    };
}

/// Data access facade over an optional remote backend.
#[derive(Debug, Clone)]
pub struct DataAccess<B: Backend = RestBackend> {
    backend: Option<B>,
    queue: MutationQueue,
    context: SyncContext,
    queue_offline_writes: bool,
    replay_batch: usize,
}

/// A queued mutation awaiting the outcome of its live attempt.
struct Recorded {
    entry_id: Option<i64>,
    key: String,
}

impl DataAccess<RestBackend> {
    /// Build the facade described by `config`.
    ///
    /// Opens the queue at `config.queue_path` (degrading to a stub if it cannot
    /// be opened) and creates the REST client when the capability probe passed.
    pub async fn from_config(config: &SyncConfig, context: SyncContext) -> Self {
        let backend = config.backend().and_then(|backend| {
            match RestBackend::new(backend, config.request_timeout) {
                Ok(client) => Some(client),
                Err(e) => {
                    warn!(error = %e, "Failed to create backend client, using synthetic dataset");
                    None
                }
            }
        });
        let queue = MutationQueue::open(&config.queue_path).await;

        info!(
            live = backend.is_some(),
            queue_durable = queue.is_durable(),
            "Data access initialized"
        );

        Self::new(backend, queue, context)
            .with_offline_writes(config.queue_offline_writes)
            .with_replay_batch(config.replay_batch)
    }

    /// A facade with no remote backend.
    #[must_use]
    pub fn offline(queue: MutationQueue, context: SyncContext) -> Self {
        Self::new(None, queue, context)
    }
}

impl<B: Backend> DataAccess<B> {
    /// Create a facade. `backend` is `None` when the capability flag is false.
    #[must_use]
    pub fn new(backend: Option<B>, queue: MutationQueue, context: SyncContext) -> Self {
        Self {
            backend,
            queue,
            context,
            queue_offline_writes: true,
            replay_batch: DEFAULT_REPLAY_BATCH,
        }
    }

    /// Whether writes made without a backend are recorded in the queue.
    #[must_use]
    pub fn with_offline_writes(mut self, enabled: bool) -> Self {
        self.queue_offline_writes = enabled;
        self
    }

    /// Maximum entries per replay pass.
    #[must_use]
    pub fn with_replay_batch(mut self, batch: usize) -> Self {
        self.replay_batch = batch;
        self
    }

    /// The capability flag.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        self.backend.is_some()
    }

    #[must_use]
    pub const fn queue(&self) -> &MutationQueue {
        &self.queue
    }

    #[must_use]
    pub const fn context(&self) -> &SyncContext {
        &self.context
    }

    // =========================================================================
    // Generic verbs
    // =========================================================================

    /// Every record of `E`, remote first with synthetic fallback.
    #[instrument(skip(self), fields(table = E::TABLE))]
    pub async fn list<E: Entity>(&self) -> Vec<E> {
        match self.fetch::<E>().await {
            Ok(items) => items,
            Err(outcome) => {
                match &outcome {
                    FetchOutcome::Failed(e) => {
                        warn!(error = %e, "Remote read failed, using synthetic dataset");
                    }
                    FetchOutcome::Empty => debug!("Remote read empty, using synthetic dataset"),
                    FetchOutcome::Unconfigured => {}
                }
                E::collection(&*self.context.read().await).to_vec()
            }
        }
    }

    async fn fetch<E: Entity>(&self) -> Result<Vec<E>, FetchOutcome> {
        let backend = self.backend.as_ref().ok_or(FetchOutcome::Unconfigured)?;
        let rows = backend.select_all(E::TABLE).await?;
        if rows.is_empty() {
            return Err(FetchOutcome::Empty);
        }
        Ok(rows.iter().map(E::from_row).collect())
    }

    /// Create a record, assigning an id when it has none.
    #[instrument(skip(self, entity), fields(table = E::TABLE))]
    pub async fn create<E: Entity>(&self, mut entity: E) -> E {
        if entity.id().is_empty() || entity.id() == UNKNOWN_ID {
            entity.set_id(Uuid::new_v4().to_string());
        }
        let action = format!("create-{}", E::NOUN);
        let row = entity.to_row();

        let stored = match &self.backend {
            Some(backend) => {
                let recorded = self.record(&action, E::TABLE, entity.id(), &row).await;
                match backend.insert(E::TABLE, &row, &recorded.key).await {
                    Ok(returned) => {
                        self.confirm(&recorded).await;
                        match returned {
                            Some(row) => adopt(&row, &entity),
                            None => entity,
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, action = %action, "Remote create failed, kept for replay");
                        upsert(&mut *self.context.write().await, entity.clone());
                        entity
                    }
                }
            }
            None => {
                if self.queue_offline_writes {
                    self.record(&action, E::TABLE, entity.id(), &row).await;
                }
                upsert(&mut *self.context.write().await, entity.clone());
                entity
            }
        };

        self.context.bus().emit(E::TOPIC, None);
        stored
    }

    /// Replace the record with `id`. Returns `None` if there is no such record.
    #[instrument(skip(self, entity), fields(table = E::TABLE))]
    pub async fn update<E: Entity>(&self, id: &str, mut entity: E) -> Option<E> {
        entity.set_id(id.to_string());
        let action = format!("update-{}", E::NOUN);
        let row = entity.to_row();

        let stored = match &self.backend {
            Some(backend) => {
                let recorded = self.record(&action, E::TABLE, id, &row).await;
                match backend.update(E::TABLE, id, &row, &recorded.key).await {
                    Ok(returned) => {
                        self.confirm(&recorded).await;
                        match returned {
                            Some(row) => adopt(&row, &entity),
                            None => entity,
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, action = %action, "Remote update failed, kept for replay");
                        upsert(&mut *self.context.write().await, entity.clone());
                        entity
                    }
                }
            }
            None => {
                let mut dataset = self.context.write().await;
                let Some(slot) = E::collection_mut(&mut dataset)
                    .iter_mut()
                    .find(|e| e.id() == id)
                else {
                    debug!(id, "Update of unknown record ignored");
                    return None;
                };
                if self.queue_offline_writes {
                    self.record(&action, E::TABLE, id, &row).await;
                }
                *slot = entity.clone();
                entity
            }
        };

        self.context.bus().emit(E::TOPIC, None);
        Some(stored)
    }

    /// Delete the record with `id`. Returns `false` if there is no such record.
    ///
    /// A remote delete is reported as successful even when the call failed; the
    /// queued entry carries it to the backend on the next replay.
    #[instrument(skip(self), fields(table = E::TABLE))]
    pub async fn delete<E: Entity>(&self, id: &str) -> bool {
        let action = format!("delete-{}", E::NOUN);

        match &self.backend {
            Some(backend) => {
                let recorded = self.record(&action, E::TABLE, id, &Value::Null).await;
                match backend.delete(E::TABLE, id, &recorded.key).await {
                    Ok(()) => self.confirm(&recorded).await,
                    Err(e) => {
                        warn!(error = %e, action = %action, "Remote delete failed, kept for replay");
                        E::collection_mut(&mut *self.context.write().await)
                            .retain(|item| item.id() != id);
                    }
                }
            }
            None => {
                let mut dataset = self.context.write().await;
                let items = E::collection_mut(&mut dataset);
                let Some(position) = items.iter().position(|e| e.id() == id) else {
                    debug!(id, "Delete of unknown record ignored");
                    return false;
                };
                if self.queue_offline_writes {
                    self.record(&action, E::TABLE, id, &Value::Null).await;
                }
                items.remove(position);
            }
        }

        self.context.bus().emit(E::TOPIC, None);
        true
    }

    // =========================================================================
    // Named accessors
    // =========================================================================

    entity_accessors!(Product, get_products, create_product, update_product, delete_product);
    entity_accessors!(Order, get_orders, create_order, update_order, delete_order);
    entity_accessors!(Project, get_projects, create_project, update_project, delete_project);
    entity_accessors!(Customer, get_customers, create_customer, update_customer, delete_customer);

    /// Move an order to `status`. Only the status column is sent remotely.
    ///
    /// Returns `None` if the order is unknown.
    #[instrument(skip(self))]
    pub async fn update_order_status(&self, id: &str, status: OrderStatus) -> Option<Order> {
        const ACTION: &str = "update-order-status";
        let row = json!({ "status": status.to_string() });

        let stored = match &self.backend {
            Some(backend) => {
                let recorded = self.record(ACTION, Order::TABLE, id, &row).await;
                match backend.update(Order::TABLE, id, &row, &recorded.key).await {
                    Ok(Some(returned)) => {
                        self.confirm(&recorded).await;
                        Some(Order::from_row(&returned))
                    }
                    Ok(None) => {
                        self.confirm(&recorded).await;
                        self.set_local_status(id, status).await
                    }
                    Err(e) => {
                        warn!(error = %e, "Remote status update failed, kept for replay");
                        self.set_local_status(id, status).await
                    }
                }
            }
            None => {
                let mut dataset = self.context.write().await;
                let Some(order) = dataset.orders.iter_mut().find(|o| o.id == id) else {
                    debug!(id, "Status update of unknown order ignored");
                    return None;
                };
                if self.queue_offline_writes {
                    self.record(ACTION, Order::TABLE, id, &row).await;
                }
                order.status = status;
                Some(order.clone())
            }
        };

        self.context.bus().emit(Order::TOPIC, None);
        stored
    }

    // =========================================================================
    // Replay
    // =========================================================================

    /// Replay queued mutations against the backend.
    ///
    /// Does nothing without a backend. Emits [`DATA_CHANGED`] once when at least
    /// one entry was applied.
    #[instrument(skip(self))]
    pub async fn replay_pending(&self) -> ReplayReport {
        let Some(backend) = &self.backend else {
            debug!("No backend configured, nothing replayed");
            return ReplayReport {
                remaining: self.queue.len().await,
                ..ReplayReport::default()
            };
        };

        let report = replay::replay_pending(&self.queue, backend, self.replay_batch).await;
        if report.applied > 0 {
            self.context.bus().emit(DATA_CHANGED, None);
        }
        report
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    async fn record(&self, action: &str, table: &str, id: &str, row: &Value) -> Recorded {
        let timestamp = chrono::Utc::now().timestamp_millis();
        let payload = QueuedMutation::new(table, id, row.clone()).to_payload();
        let entry_id = self.queue.enqueue_at(action, payload, timestamp).await;
        // Without a queue entry the attempt is never replayed, so any unique key will do
        let key = match entry_id {
            Some(entry_id) => idempotency_key(action, timestamp, entry_id),
            None => format!("{action}:{timestamp}:{}", Uuid::new_v4()),
        };
        Recorded { entry_id, key }
    }

    async fn confirm(&self, recorded: &Recorded) {
        if let Some(entry_id) = recorded.entry_id {
            self.queue.remove(entry_id).await;
        }
    }

    async fn set_local_status(&self, id: &str, status: OrderStatus) -> Option<Order> {
        let mut dataset = self.context.write().await;
        let order = dataset.orders.iter_mut().find(|o| o.id == id)?;
        order.status = status;
        Some(order.clone())
    }
}

/// Map a row returned by the backend, keeping the local id if the row has none.
fn adopt<E: Entity>(row: &Value, sent: &E) -> E {
    let mut entity = E::from_row(row);
    if entity.id() == UNKNOWN_ID {
        entity.set_id(sent.id().to_string());
    }
    entity
}

fn upsert<E: Entity>(dataset: &mut SyntheticDataset, entity: E) {
    let items = E::collection_mut(dataset);
    match items.iter_mut().find(|e| e.id() == entity.id()) {
        Some(slot) => *slot = entity,
        None => items.push(entity),
    }
}
