//! In-process change notifications.
//!
//! Writers emit a topic after every successful write; readers subscribe and
//! re-read state wholesale. There are no payload deltas, no wildcard topics and
//! no once-only listeners.

use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, PoisonError, RwLock};

use serde_json::Value;
use tracing::error;

/// Catch-all topic, emitted when several collections may have changed at once.
pub const DATA_CHANGED: &str = "data-changed";

type Listener = Arc<dyn Fn(Option<&Value>) + Send + Sync>;

/// Handle returned by [`EventBus::on`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Minimal publish/subscribe bus.
#[derive(Default)]
pub struct EventBus {
    registry: RwLock<Registry>,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    topics: HashMap<String, Vec<(ListenerId, Listener)>>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registry = self.registry.read().unwrap_or_else(PoisonError::into_inner);
        let topics: Vec<&str> = registry.topics.keys().map(String::as_str).collect();
        f.debug_struct("EventBus").field("topics", &topics).finish()
    }
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `listener` to `event`.
    pub fn on<F>(&self, event: &str, listener: F) -> ListenerId
    where
        F: Fn(Option<&Value>) + Send + Sync + 'static,
    {
        let mut registry = self
            .registry
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        registry.next_id += 1;
        let id = ListenerId(registry.next_id);
        registry
            .topics
            .entry(event.to_string())
            .or_default()
            .push((id, Arc::new(listener)));
        id
    }

    /// Unsubscribe. Returns whether the listener was registered.
    pub fn off(&self, event: &str, id: ListenerId) -> bool {
        let mut registry = self
            .registry
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let Some(listeners) = registry.topics.get_mut(event) else {
            return false;
        };

        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        let removed = listeners.len() != before;
        if listeners.is_empty() {
            registry.topics.remove(event);
        }
        removed
    }

    /// Invoke every listener of `event` in registration order.
    ///
    /// Listeners run on a snapshot taken before the first call, outside the
    /// registry lock, so they may subscribe or unsubscribe freely. A panicking
    /// listener is logged and the remaining listeners still run. Returns the
    /// number of listeners invoked.
    pub fn emit(&self, event: &str, data: Option<&Value>) -> usize {
        let snapshot: Vec<(ListenerId, Listener)> = {
            let registry = self.registry.read().unwrap_or_else(PoisonError::into_inner);
            registry.topics.get(event).cloned().unwrap_or_default()
        };

        for (id, listener) in &snapshot {
            if catch_unwind(AssertUnwindSafe(|| listener(data))).is_err() {
                error!(event, listener = id.0, "Event listener panicked");
            }
        }
        snapshot.len()
    }

    /// Number of listeners currently subscribed to `event`.
    #[must_use]
    pub fn listener_count(&self, event: &str) -> usize {
        self.registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .topics
            .get(event)
            .map_or(0, Vec::len)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use super::*;

    #[test]
    fn test_emit_reaches_listeners_in_order() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second"] {
            let seen = Arc::clone(&seen);
            bus.on("orders-changed", move |_| seen.lock().unwrap().push(tag));
        }

        assert_eq!(bus.emit("orders-changed", None), 2);
        assert_eq!(*seen.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn test_emit_without_listeners() {
        let bus = EventBus::new();
        assert_eq!(bus.emit("nobody-home", None), 0);
    }

    #[test]
    fn test_off_unsubscribes() {
        let bus = EventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let id = bus.on(DATA_CHANGED, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        bus.emit(DATA_CHANGED, None);
        assert!(bus.off(DATA_CHANGED, id));
        assert!(!bus.off(DATA_CHANGED, id));
        bus.emit(DATA_CHANGED, None);

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(bus.listener_count(DATA_CHANGED), 0);
    }

    #[test]
    fn test_panicking_listener_does_not_stop_others() {
        let bus = EventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));

        bus.on("projects-changed", |_| panic!("listener failure"));
        let counter = Arc::clone(&hits);
        bus.on("projects-changed", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(bus.emit("projects-changed", None), 2);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_payload_is_passed_through() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&seen);
        bus.on("custom", move |data| *slot.lock().unwrap() = data.cloned());

        bus.emit("custom", Some(&json!({"id": "o-1"})));
        assert_eq!(*seen.lock().unwrap(), Some(json!({"id": "o-1"})));
    }

    #[test]
    fn test_listener_may_unsubscribe_during_emit() {
        let bus = Arc::new(EventBus::new());
        let slot: Arc<Mutex<Option<ListenerId>>> = Arc::new(Mutex::new(None));

        let inner_bus = Arc::clone(&bus);
        let inner_slot = Arc::clone(&slot);
        let id = bus.on("once-ish", move |_| {
            if let Some(id) = *inner_slot.lock().unwrap() {
                inner_bus.off("once-ish", id);
            }
        });
        *slot.lock().unwrap() = Some(id);

        assert_eq!(bus.emit("once-ish", None), 1);
        assert_eq!(bus.emit("once-ish", None), 0);
    }
}
