//! Integration test support for Siteline.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p siteline-integration-tests
//! ```
//!
//! No external services are needed: the remote backend is replaced by
//! [`StubBackend`], an in-memory table store with failure injection and call
//! recording, and change notifications are captured with [`EventRecorder`].
//!
//! # Test Categories
//!
//! - `mutation_queue` - Queue ordering, removal and degraded mode
//! - `facade_offline` - Capability flag false, synthetic dataset only
//! - `facade_live` - Remote reads and writes, fallback on failure
//! - `replay` - Draining the queue back into the backend

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use siteline_sync::{Backend, BackendError, DataAccess, EventBus, MutationQueue, SyncContext};

// =============================================================================
// Stub backend
// =============================================================================

/// One call made against a [`StubBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    /// `select`, `insert`, `update` or `delete`.
    pub verb: &'static str,
    pub table: String,
    pub id: Option<String>,
    pub idempotency_key: Option<String>,
}

/// Scriptable in-memory backend.
///
/// Clones share state, so a test can keep a handle while the facade owns
/// another.
#[derive(Debug, Clone, Default)]
pub struct StubBackend {
    state: Arc<Mutex<StubState>>,
}

#[derive(Debug, Default)]
struct StubState {
    tables: HashMap<String, Vec<Value>>,
    fail_reads: bool,
    fail_writes: bool,
    failing_ids: HashSet<String>,
    seen_keys: HashSet<String>,
    calls: Vec<Call>,
}

fn stub_failure() -> BackendError {
    BackendError::Status {
        status: 503,
        body: "stub backend unavailable".to_string(),
    }
}

fn row_id(row: &Value) -> Option<&str> {
    row.get("id").and_then(Value::as_str)
}

impl StubBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, StubState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the contents of `table`.
    #[must_use]
    pub fn with_rows(self, table: &str, rows: Vec<Value>) -> Self {
        self.state().tables.insert(table.to_string(), rows);
        self
    }

    /// Make every `select_all` fail.
    pub fn fail_reads(&self, fail: bool) {
        self.state().fail_reads = fail;
    }

    /// Make every write fail.
    pub fn fail_writes(&self, fail: bool) {
        self.state().fail_writes = fail;
    }

    /// Make writes targeting `id` fail.
    pub fn fail_id(&self, id: &str) {
        self.state().failing_ids.insert(id.to_string());
    }

    /// Stop failing writes targeting `id`.
    pub fn heal_id(&self, id: &str) {
        self.state().failing_ids.remove(id);
    }

    /// Current rows of `table`.
    #[must_use]
    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.state().tables.get(table).cloned().unwrap_or_default()
    }

    /// Every call made so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    /// Write calls only.
    #[must_use]
    pub fn writes(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| call.verb != "select")
            .collect()
    }

    fn begin_write(
        &self,
        verb: &'static str,
        table: &str,
        id: Option<&str>,
        key: &str,
    ) -> Result<MutexGuard<'_, StubState>, BackendError> {
        let mut state = self.state();
        state.calls.push(Call {
            verb,
            table: table.to_string(),
            id: id.map(str::to_string),
            idempotency_key: Some(key.to_string()),
        });
        let blocked = id.is_some_and(|id| state.failing_ids.contains(id));
        if state.fail_writes || blocked {
            return Err(stub_failure());
        }
        Ok(state)
    }
}

impl Backend for StubBackend {
    async fn select_all(&self, table: &str) -> Result<Vec<Value>, BackendError> {
        let mut state = self.state();
        state.calls.push(Call {
            verb: "select",
            table: table.to_string(),
            id: None,
            idempotency_key: None,
        });
        if state.fail_reads {
            return Err(stub_failure());
        }
        Ok(state.tables.get(table).cloned().unwrap_or_default())
    }

    async fn insert(
        &self,
        table: &str,
        row: &Value,
        idempotency_key: &str,
    ) -> Result<Option<Value>, BackendError> {
        let mut state = self.begin_write("insert", table, row_id(row), idempotency_key)?;
        // A key already applied is acknowledged without a second insert
        if state.seen_keys.insert(idempotency_key.to_string()) {
            state
                .tables
                .entry(table.to_string())
                .or_default()
                .push(row.clone());
        }
        Ok(Some(row.clone()))
    }

    async fn update(
        &self,
        table: &str,
        id: &str,
        row: &Value,
        idempotency_key: &str,
    ) -> Result<Option<Value>, BackendError> {
        let mut state = self.begin_write("update", table, Some(id), idempotency_key)?;
        state.seen_keys.insert(idempotency_key.to_string());
        let Some(existing) = state
            .tables
            .get_mut(table)
            .and_then(|rows| rows.iter_mut().find(|r| row_id(r) == Some(id)))
        else {
            return Ok(None);
        };

        if let (Some(target), Some(patch)) = (existing.as_object_mut(), row.as_object()) {
            for (key, value) in patch {
                target.insert(key.clone(), value.clone());
            }
        }
        Ok(Some(existing.clone()))
    }

    async fn delete(
        &self,
        table: &str,
        id: &str,
        idempotency_key: &str,
    ) -> Result<(), BackendError> {
        let mut state = self.begin_write("delete", table, Some(id), idempotency_key)?;
        state.seen_keys.insert(idempotency_key.to_string());
        if let Some(rows) = state.tables.get_mut(table) {
            rows.retain(|r| row_id(r) != Some(id));
        }
        Ok(())
    }
}

// =============================================================================
// Event recorder
// =============================================================================

/// Records every emission of a set of topics.
#[derive(Debug, Clone, Default)]
pub struct EventRecorder {
    events: Arc<Mutex<Vec<String>>>,
}

impl EventRecorder {
    /// Subscribe to `topics` on `bus`.
    #[must_use]
    pub fn attach(bus: &EventBus, topics: &[&str]) -> Self {
        let recorder = Self::default();
        for topic in topics {
            let events = Arc::clone(&recorder.events);
            let name = (*topic).to_string();
            bus.on(topic, move |_| {
                events
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(name.clone());
            });
        }
        recorder
    }

    /// Topics emitted so far, in order.
    #[must_use]
    pub fn events(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of emissions of `topic`.
    #[must_use]
    pub fn count(&self, topic: &str) -> usize {
        self.events().iter().filter(|e| *e == topic).count()
    }
}

// =============================================================================
// Facade builders
// =============================================================================

/// A live facade over `backend`, an in-memory queue and a fresh seeded context.
pub async fn live_facade(backend: StubBackend) -> DataAccess<StubBackend> {
    DataAccess::new(
        Some(backend),
        MutationQueue::open_in_memory().await,
        SyncContext::init(),
    )
}

/// A facade with no backend, an in-memory queue and a fresh seeded context.
pub async fn offline_facade() -> DataAccess {
    DataAccess::offline(MutationQueue::open_in_memory().await, SyncContext::init())
}
