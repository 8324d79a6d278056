//! Forwarding of channel messages into a broker.

use crate::core::Broker;
use crate::notify::SignalWatcher;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A running task that calls [`Broker::notify`] once per received signal.
///
/// Any payload carried by a signal is ignored. The task stops when every
/// sender is gone or when the bridge is dropped.
///
/// # Examples
///
/// ```rust,no_run
/// use hotswap_inject::core::{Broker, EventBroker};
/// use hotswap_inject::notify::{DEFAULT_SIGNAL_NAME, SignalBridge};
/// use std::sync::Arc;
/// use tokio::sync::mpsc;
///
/// # async fn example() {
/// let broker: Arc<dyn Broker> = Arc::new(EventBroker::new());
/// let (tx, rx) = mpsc::channel::<String>(16);
/// let _bridge = SignalBridge::attach(DEFAULT_SIGNAL_NAME, rx, Arc::clone(&broker));
///
/// tx.send("bundle reloaded".to_string()).await.unwrap();
/// # }
/// ```
pub struct SignalBridge {
    name: String,
    forwarded: Arc<AtomicU64>,
    task: Option<JoinHandle<()>>,
    watcher: Option<SignalWatcher>,
}

impl SignalBridge {
    /// Spawn the forwarding task on the current tokio runtime.
    pub fn attach<T>(
        name: impl Into<String>,
        mut signals: mpsc::Receiver<T>,
        broker: Arc<dyn Broker>,
    ) -> Self
    where
        T: Send + 'static,
    {
        let name = name.into();
        let forwarded = Arc::new(AtomicU64::new(0));

        let task = {
            let name = name.clone();
            let forwarded = Arc::clone(&forwarded);
            tokio::spawn(async move {
                while signals.recv().await.is_some() {
                    tracing::trace!(signal = %name, "reload signal received");
                    broker.notify();
                    forwarded.fetch_add(1, Ordering::SeqCst);
                }
                tracing::debug!(signal = %name, "signal source closed");
            })
        };

        Self {
            name,
            forwarded,
            task: Some(task),
            watcher: None,
        }
    }

    /// A bridge with no source and no task; it never forwards anything.
    pub(crate) fn idle(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            forwarded: Arc::new(AtomicU64::new(0)),
            task: None,
            watcher: None,
        }
    }

    /// Keep `watcher` alive for as long as this bridge runs.
    pub(crate) fn with_watcher(mut self, watcher: SignalWatcher) -> Self {
        self.watcher = Some(watcher);
        self
    }

    /// The trigger-file watcher feeding this bridge, if any.
    pub fn watcher(&self) -> Option<&SignalWatcher> {
        self.watcher.as_ref()
    }

    /// Identifier of the signal this bridge listens to.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// How many signals have been forwarded so far.
    pub fn signals_forwarded(&self) -> u64 {
        self.forwarded.load(Ordering::SeqCst)
    }

    /// Whether the forwarding task has stopped. Always true for an idle
    /// bridge.
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }
}

impl Drop for SignalBridge {
    fn drop(&mut self) {
        if let Some(task) = &self.task {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::EventBroker;
    use crate::notify::DEFAULT_SIGNAL_NAME;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    async fn settle<F: Fn() -> bool>(condition: F) {
        for _ in 0..100 {
            if condition() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    #[tokio::test]
    async fn test_forwards_each_signal() {
        let broker: Arc<dyn Broker> = Arc::new(EventBroker::new());
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let _handle = broker.subscribe_handler(Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        let (tx, rx) = mpsc::channel::<&'static str>(8);
        let bridge = SignalBridge::attach(DEFAULT_SIGNAL_NAME, rx, Arc::clone(&broker));
        assert_eq!(bridge.name(), DEFAULT_SIGNAL_NAME);

        tx.send("ignored payload").await.unwrap();
        tx.send("another").await.unwrap();
        tx.send("third").await.unwrap();

        settle(|| bridge.signals_forwarded() == 3).await;
        assert_eq!(bridge.signals_forwarded(), 3);
        assert_eq!(broker.current_count(), 3);
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_stops_when_sender_closes() {
        let broker: Arc<dyn Broker> = Arc::new(EventBroker::new());
        let (tx, rx) = mpsc::channel::<()>(1);
        let bridge = SignalBridge::attach("test", rx, broker);

        drop(tx);
        settle(|| bridge.is_finished()).await;
        assert!(bridge.is_finished());
    }

    #[tokio::test]
    async fn test_drop_stops_forwarding() {
        let broker: Arc<dyn Broker> = Arc::new(EventBroker::new());
        let (tx, rx) = mpsc::channel::<()>(8);
        let bridge = SignalBridge::attach("test", rx, Arc::clone(&broker));

        drop(bridge);
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert!(tx.send(()).await.is_err());
        assert_eq!(broker.current_count(), 0);
    }

    #[test]
    fn test_idle_bridge_never_forwards() {
        let bridge = SignalBridge::idle(DEFAULT_SIGNAL_NAME);
        assert_eq!(bridge.name(), DEFAULT_SIGNAL_NAME);
        assert!(bridge.is_finished());
        assert!(bridge.watcher().is_none());
        assert_eq!(bridge.signals_forwarded(), 0);
    }
}
