//! Drop-to-unsubscribe cancellation handles.

use crate::core::registry::{ListenerId, ListenerRegistry};
use std::fmt;
use std::sync::Weak;
use std::sync::atomic::{AtomicBool, Ordering};

#[cfg(feature = "metrics")]
use crate::metrics::BrokerMetrics;

/// Handle for a subscription that can be dropped to unsubscribe.
///
/// The handle only holds a weak reference to the broker's registry, so it
/// never keeps a broker alive. Firing it (explicitly via [`cancel`](Self::cancel)
/// or implicitly on drop) removes exactly the listener it was created for.
/// Only the first firing has an effect; later ones are no-ops, as is firing
/// after the broker is gone.
///
/// Store the handle as a field of whatever owns the callback to tie the
/// subscription to that owner's lifetime.
///
/// # Examples
///
/// ```rust
/// use hotswap_inject::core::{Broker, EventBroker};
///
/// let broker = EventBroker::new();
/// let handle = broker.subscribe(|| println!("reloaded"));
/// assert_eq!(broker.listener_count(), 1);
///
/// handle.cancel();
/// handle.cancel();
/// assert_eq!(broker.listener_count(), 0);
/// ```
#[must_use = "dropping a CancellationHandle immediately unsubscribes"]
pub struct CancellationHandle {
    id: Option<ListenerId>,
    registry: Weak<ListenerRegistry>,
    fired: AtomicBool,
    #[cfg(feature = "metrics")]
    metrics: Option<BrokerMetrics>,
}

impl CancellationHandle {
    pub(crate) fn new(id: ListenerId, registry: Weak<ListenerRegistry>) -> Self {
        Self {
            id: Some(id),
            registry,
            fired: AtomicBool::new(false),
            #[cfg(feature = "metrics")]
            metrics: None,
        }
    }

    #[cfg(feature = "metrics")]
    pub(crate) fn with_metrics(mut self, metrics: Option<BrokerMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// A handle that is already fired and refers to no listener.
    pub fn inert() -> Self {
        Self {
            id: None,
            registry: Weak::new(),
            fired: AtomicBool::new(true),
            #[cfg(feature = "metrics")]
            metrics: None,
        }
    }

    /// Remove the listener if this is the first firing and the registry is
    /// still alive.
    pub fn cancel(&self) {
        self.fire();
    }

    /// Fire the handle; returns whether a listener was actually removed.
    fn fire(&self) -> bool {
        if self.fired.swap(true, Ordering::AcqRel) {
            return false;
        }

        let Some(id) = self.id else {
            return false;
        };

        let Some(registry) = self.registry.upgrade() else {
            tracing::trace!(%id, "subscription cancelled after broker teardown");
            return false;
        };

        let removed = registry.remove(id);
        tracing::trace!(%id, removed, "subscription cancelled");

        #[cfg(feature = "metrics")]
        if let (true, Some(metrics)) = (removed, &self.metrics) {
            metrics.record_cancel(registry.len());
        }

        removed
    }

    /// Whether the handle has fired.
    pub fn is_cancelled(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }

    /// The listener id this handle controls, or `None` for an inert handle.
    pub fn id(&self) -> Option<ListenerId> {
        self.id
    }
}

impl Drop for CancellationHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for CancellationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancellationHandle")
            .field("id", &self.id)
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
