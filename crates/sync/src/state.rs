//! Shared synchronization context.

use std::sync::Arc;

use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::dataset::SyntheticDataset;
use crate::events::EventBus;

/// The synthetic dataset and the change bus, shared by the facade and readers.
///
/// This struct is cheaply cloneable via `Arc`. Each context is isolated: two
/// contexts never observe each other's writes.
#[derive(Clone, Debug)]
pub struct SyncContext {
    inner: Arc<SyncContextInner>,
}

#[derive(Debug)]
struct SyncContextInner {
    dataset: RwLock<SyntheticDataset>,
    bus: EventBus,
}

impl SyncContext {
    /// A context seeded with the demo fixtures.
    #[must_use]
    pub fn init() -> Self {
        Self::with_dataset(SyntheticDataset::seeded())
    }

    /// A context over an explicit dataset.
    #[must_use]
    pub fn with_dataset(dataset: SyntheticDataset) -> Self {
        Self {
            inner: Arc::new(SyncContextInner {
                dataset: RwLock::new(dataset),
                bus: EventBus::new(),
            }),
        }
    }

    /// Restore the demo fixtures. Subscriptions are kept.
    pub async fn reset(&self) {
        *self.inner.dataset.write().await = SyntheticDataset::seeded();
    }

    /// A copy of the current dataset.
    pub async fn snapshot(&self) -> SyntheticDataset {
        self.inner.dataset.read().await.clone()
    }

    /// Get a reference to the change bus.
    #[must_use]
    pub fn bus(&self) -> &EventBus {
        &self.inner.bus
    }

    pub(crate) async fn read(&self) -> RwLockReadGuard<'_, SyntheticDataset> {
        self.inner.dataset.read().await
    }

    pub(crate) async fn write(&self) -> RwLockWriteGuard<'_, SyntheticDataset> {
        self.inner.dataset.write().await
    }
}

impl Default for SyncContext {
    fn default() -> Self {
        Self::init()
    }
}
