//! Ordered listener storage shared between a broker and its handles.

use arc_swap::ArcSwap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Callback invoked on every notification.
pub type Handler = Arc<dyn Fn() + Send + Sync>;

/// Identifier of a single registration.
///
/// Ids are allocated from a per-registry counter and never reused, so two
/// subscriptions with behaviorally identical handlers are still distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Raw numeric value of the id.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

/// A registered handler together with its identity.
#[derive(Clone)]
pub struct Listener {
    id: ListenerId,
    handler: Handler,
}

impl Listener {
    /// The id this listener was registered under.
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Invoke the handler.
    pub fn call(&self) {
        (self.handler)()
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener").field("id", &self.id).finish()
    }
}

/// Insertion-ordered registry of listeners.
///
/// The listener sequence is published through `ArcSwap`: mutations go through
/// read-copy-update, and [`snapshot`](Self::snapshot) hands out the currently
/// published sequence without blocking writers. No lock is held while a
/// caller iterates a snapshot, so handlers may subscribe or cancel freely.
pub struct ListenerRegistry {
    listeners: ArcSwap<Vec<Listener>>,
    next_id: AtomicU64,
}

impl ListenerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            listeners: ArcSwap::from_pointee(Vec::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Append a handler and return its freshly allocated id.
    pub fn insert(&self, handler: Handler) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let listener = Listener { id, handler };

        self.listeners.rcu(|current| {
            let mut next = Vec::with_capacity(current.len() + 1);
            next.extend(current.iter().cloned());
            next.push(listener.clone());
            next
        });

        id
    }

    /// Remove the listener registered under `id`.
    ///
    /// Returns `true` if a listener was removed. Unknown or already removed
    /// ids are ignored.
    pub fn remove(&self, id: ListenerId) -> bool {
        let previous = self.listeners.rcu(|current| {
            if current.iter().any(|l| l.id == id) {
                Arc::new(current.iter().filter(|l| l.id != id).cloned().collect())
            } else {
                Arc::clone(current)
            }
        });

        previous.iter().any(|l| l.id == id)
    }

    /// The listeners registered right now, in insertion order.
    pub fn snapshot(&self) -> Arc<Vec<Listener>> {
        self.listeners.load_full()
    }

    /// Whether a listener with this id is currently registered.
    pub fn contains(&self, id: ListenerId) -> bool {
        self.listeners.load().iter().any(|l| l.id == id)
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.listeners.load().len()
    }

    /// Whether no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.listeners.load().is_empty()
    }
}

impl Default for ListenerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("len", &self.len())
            .finish()
    }
}
