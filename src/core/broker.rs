//! The event broker: subscription, fan-out and the event counter.

use crate::core::handle::CancellationHandle;
use crate::core::registry::{Handler, ListenerRegistry};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

#[cfg(feature = "metrics")]
use crate::metrics::BrokerMetrics;

/// A hub that fans reload events out to registered listeners.
///
/// Implemented by the live [`EventBroker`] and the no-op [`InertBroker`]; the
/// variant is chosen once at startup (see [`BrokerMode`](crate::settings::BrokerMode)).
pub trait Broker: Send + Sync {
    /// Register a handler and return the handle that removes it again.
    fn subscribe_handler(&self, handler: Handler) -> CancellationHandle;

    /// Record one external event and invoke every registered listener.
    fn notify(&self);

    /// Number of events observed so far.
    fn current_count(&self) -> u64;

    /// Number of listeners currently registered.
    fn listener_count(&self) -> usize;

    /// Register a closure. See [`subscribe_handler`](Self::subscribe_handler).
    fn subscribe<F>(&self, handler: F) -> CancellationHandle
    where
        F: Fn() + Send + Sync + 'static,
        Self: Sized,
    {
        self.subscribe_handler(Arc::new(handler))
    }
}

/// The live broker.
///
/// Holds a monotonically increasing event counter and an ordered listener
/// registry. [`notify`](Broker::notify) increments the counter and then calls
/// each listener from a snapshot of the registry taken at that moment, so
/// listeners may subscribe or cancel (themselves or others) from inside their
/// callback. A listener cancelled during a fan-out may still receive that
/// in-flight event but none after it.
///
/// Handlers run synchronously on the notifying thread and should be quick.
///
/// # Examples
///
/// ```rust
/// use hotswap_inject::core::{Broker, EventBroker};
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// let broker = EventBroker::new();
/// let hits = Arc::new(AtomicUsize::new(0));
///
/// let counter = Arc::clone(&hits);
/// let handle = broker.subscribe(move || {
///     counter.fetch_add(1, Ordering::SeqCst);
/// });
///
/// broker.notify();
/// broker.notify();
/// assert_eq!(hits.load(Ordering::SeqCst), 2);
/// assert_eq!(broker.current_count(), 2);
///
/// drop(handle);
/// broker.notify();
/// assert_eq!(hits.load(Ordering::SeqCst), 2);
/// assert_eq!(broker.current_count(), 3);
/// ```
pub struct EventBroker {
    counter: AtomicU64,
    registry: Arc<ListenerRegistry>,
    #[cfg(feature = "metrics")]
    metrics: Option<BrokerMetrics>,
}

impl EventBroker {
    /// Create a broker with no listeners and a zero counter.
    pub fn new() -> Self {
        Self {
            counter: AtomicU64::new(0),
            registry: Arc::new(ListenerRegistry::new()),
            #[cfg(feature = "metrics")]
            metrics: None,
        }
    }

    /// Attach OpenTelemetry instruments to this broker.
    #[cfg(feature = "metrics")]
    pub fn with_metrics(mut self, metrics: BrokerMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }
}

impl Broker for EventBroker {
    fn subscribe_handler(&self, handler: Handler) -> CancellationHandle {
        let id = self.registry.insert(handler);
        tracing::trace!(%id, listeners = self.registry.len(), "listener subscribed");

        #[cfg(feature = "metrics")]
        if let Some(metrics) = &self.metrics {
            metrics.record_subscribe(self.registry.len());
        }

        let handle = CancellationHandle::new(id, Arc::downgrade(&self.registry));
        #[cfg(feature = "metrics")]
        let handle = handle.with_metrics(self.metrics.clone());
        handle
    }

    fn notify(&self) {
        let count = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let snapshot = self.registry.snapshot();
        tracing::trace!(
            count,
            listeners = snapshot.len(),
            "fanning out reload event"
        );

        #[cfg(feature = "metrics")]
        let timer = self.metrics.as_ref().map(BrokerMetrics::start_fanout);

        for listener in snapshot.iter() {
            listener.call();
        }

        #[cfg(feature = "metrics")]
        if let (Some(metrics), Some(timer)) = (&self.metrics, timer) {
            metrics.record_fanout(timer, snapshot.len());
        }
    }

    fn current_count(&self) -> u64 {
        self.counter.load(Ordering::SeqCst)
    }

    fn listener_count(&self) -> usize {
        self.registry.len()
    }
}

impl Default for EventBroker {
    fn default() -> Self {
        Self::new()
    }
}

/// A broker that does nothing.
///
/// Used when injection is disabled: every subscription gets an already
/// cancelled handle, nothing is ever stored, and the counter stays at zero.
#[derive(Debug, Default, Clone, Copy)]
pub struct InertBroker;

impl Broker for InertBroker {
    fn subscribe_handler(&self, _handler: Handler) -> CancellationHandle {
        CancellationHandle::inert()
    }

    fn notify(&self) {}

    fn current_count(&self) -> u64 {
        0
    }

    fn listener_count(&self) -> usize {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;

    fn counting(broker: &EventBroker) -> (Arc<AtomicUsize>, CancellationHandle) {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let handle = broker.subscribe(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        (hits, handle)
    }

    #[test]
    fn test_notify_counts_and_fans_out() {
        let broker = EventBroker::new();
        let (hits, handle) = counting(&broker);

        broker.notify();
        broker.notify();
        broker.notify();
        assert_eq!(hits.load(Ordering::SeqCst), 3);
        assert_eq!(broker.current_count(), 3);

        handle.cancel();
        broker.notify();
        assert_eq!(hits.load(Ordering::SeqCst), 3);
        assert_eq!(broker.current_count(), 4);
    }

    #[test]
    fn test_counter_without_listeners() {
        let broker = EventBroker::new();
        assert_eq!(broker.current_count(), 0);
        for _ in 0..5 {
            broker.notify();
        }
        assert_eq!(broker.current_count(), 5);
    }

    #[test]
    fn test_fanout_order_matches_subscription_order() {
        let broker = EventBroker::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        let handles: Vec<_> = ["a", "b", "c"]
            .into_iter()
            .map(|tag| {
                let order = Arc::clone(&order);
                broker.subscribe(move || order.lock().unwrap().push(tag))
            })
            .collect();

        broker.notify();
        assert_eq!(*order.lock().unwrap(), vec!["a", "b", "c"]);
        drop(handles);
    }

    #[test]
    fn test_subscribe_then_cancel_never_fires() {
        let broker = EventBroker::new();
        let (hits, handle) = counting(&broker);
        drop(handle);

        broker.notify();
        broker.notify();
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_identical_handlers_cancel_independently() {
        let broker = EventBroker::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let handler: Handler = {
            let hits = Arc::clone(&hits);
            Arc::new(move || {
                hits.fetch_add(1, Ordering::SeqCst);
            })
        };

        let first = broker.subscribe_handler(Arc::clone(&handler));
        let _second = broker.subscribe_handler(handler);

        first.cancel();
        broker.notify();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(broker.listener_count(), 1);
    }

    #[test]
    fn test_listener_cancels_sibling_during_fanout() {
        let broker = EventBroker::new();
        let slot: Arc<Mutex<Option<CancellationHandle>>> = Arc::new(Mutex::new(None));

        let _l1 = {
            let slot = Arc::clone(&slot);
            broker.subscribe(move || {
                if let Some(handle) = slot.lock().unwrap().as_ref() {
                    handle.cancel();
                }
            })
        };
        let (l2_hits, l2_handle) = counting(&broker);
        *slot.lock().unwrap() = Some(l2_handle);

        broker.notify();
        let after_first = l2_hits.load(Ordering::SeqCst);
        assert!(after_first <= 1);

        broker.notify();
        broker.notify();
        assert_eq!(l2_hits.load(Ordering::SeqCst), after_first);
        assert_eq!(broker.listener_count(), 1);
    }

    #[test]
    fn test_handler_can_subscribe_during_fanout() {
        let broker = Arc::new(EventBroker::new());
        let spawned = Arc::new(Mutex::new(Vec::new()));

        let _handle = {
            let inner = Arc::clone(&broker);
            let spawned = Arc::clone(&spawned);
            broker.subscribe(move || {
                let handle = inner.subscribe(|| {});
                spawned.lock().unwrap().push(handle);
            })
        };

        broker.notify();
        assert_eq!(broker.listener_count(), 2);
        broker.notify();
        assert_eq!(broker.listener_count(), 3);
    }

    #[test]
    fn test_handles_inert_after_broker_dropped() {
        let broker = EventBroker::new();
        let (_hits, handle) = counting(&broker);
        drop(broker);

        handle.cancel();
        assert!(handle.is_cancelled());
    }

    #[test]
    fn test_concurrent_notify_is_exact() {
        let broker = Arc::new(EventBroker::new());
        let (hits, _handle) = counting(&broker);

        let threads: Vec<_> = (0..4)
            .map(|_| {
                let broker = Arc::clone(&broker);
                std::thread::spawn(move || {
                    for _ in 0..250 {
                        broker.notify();
                    }
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }

        assert_eq!(broker.current_count(), 1000);
        assert_eq!(hits.load(Ordering::SeqCst), 1000);
    }

    #[test]
    fn test_inert_broker() {
        let broker = InertBroker;
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let handle = broker.subscribe(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(handle.is_cancelled());
        broker.notify();
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(broker.current_count(), 0);
        assert_eq!(broker.listener_count(), 0);
    }
}
