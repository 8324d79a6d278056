//! The hub: capability gate plus broker, and the process-wide instance.

use crate::core::{Broker, CancellationHandle, CapabilityGate, HubBuilder};
use crate::error::{InjectError, Result};
use crate::settings::{BrokerMode, Settings};
use std::fmt;
use std::sync::{Arc, OnceLock};

#[cfg(feature = "file-watch")]
use crate::notify::{SignalBridge, SignalWatcher};
#[cfg(feature = "file-watch")]
use std::path::Path;

static GLOBAL: OnceLock<Hub> = OnceLock::new();

/// Everything a reload-aware program talks to.
///
/// A `Hub` owns the [`CapabilityGate`] and the [`Broker`] selected by its
/// [`Settings`]. Most programs use the process-wide instance from
/// [`global`]; tests and embedders can build as many independent hubs as
/// they like with [`Hub::builder`].
///
/// # Examples
///
/// ```rust
/// use hotswap_inject::prelude::*;
///
/// let hub = Hub::builder().with_mode(BrokerMode::Live).build();
/// hub.ensure_loaded();
///
/// let _handle = hub.subscribe(|| println!("code reloaded"));
/// hub.notify();
/// assert_eq!(hub.current_count(), 1);
/// ```
pub struct Hub {
    gate: CapabilityGate,
    broker: Arc<dyn Broker>,
    settings: Settings,
}

impl Hub {
    pub(crate) fn from_parts(
        gate: CapabilityGate,
        broker: Arc<dyn Broker>,
        settings: Settings,
    ) -> Self {
        Self {
            gate,
            broker,
            settings,
        }
    }

    /// Create a new builder for constructing a hub.
    pub fn builder() -> HubBuilder {
        HubBuilder::new()
    }

    /// Load the external reload capability on first call; no-op afterwards.
    pub fn ensure_loaded(&self) {
        self.gate.ensure_loaded();
    }

    /// Register a callback invoked on every reload event.
    ///
    /// Dropping or cancelling the returned handle unsubscribes.
    pub fn subscribe<F>(&self, handler: F) -> CancellationHandle
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.broker.subscribe_handler(Arc::new(handler))
    }

    /// Record one reload event and fan it out.
    ///
    /// Called by the inbound signal source, not by ordinary consumers.
    pub fn notify(&self) {
        self.broker.notify();
    }

    /// Number of reload events observed so far.
    pub fn current_count(&self) -> u64 {
        self.broker.current_count()
    }

    /// Number of listeners currently registered.
    pub fn listener_count(&self) -> usize {
        self.broker.listener_count()
    }

    /// The broker variant this hub runs.
    pub fn mode(&self) -> BrokerMode {
        self.settings.mode
    }

    /// Name of the capability loader behind the gate.
    pub fn capability_name(&self) -> String {
        self.gate.loader_name()
    }

    /// The settings this hub was built from.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Shared handle to the underlying broker, e.g. for a signal bridge.
    pub fn broker(&self) -> Arc<dyn Broker> {
        Arc::clone(&self.broker)
    }

    /// Raise a reload signal whenever the trigger file at `path` changes.
    ///
    /// Uses the hub's signal name and debounce window. Signals stop when the
    /// returned bridge is dropped. Must be called inside a tokio runtime.
    ///
    /// An inert hub ignores every signal, so it neither touches `path` nor
    /// starts a watcher; it returns an idle bridge instead.
    ///
    /// # Errors
    ///
    /// Returns an error if the watcher cannot be created or the path cannot
    /// be watched.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// # use hotswap_inject::prelude::*;
    /// # async fn example() -> Result<()> {
    /// let hub = Hub::builder().with_mode(BrokerMode::Live).build();
    /// let _bridge = hub.watch_signal("/tmp/injection.trigger").await?;
    /// # Ok(())
    /// # }
    /// ```
    #[cfg(feature = "file-watch")]
    pub async fn watch_signal(&self, path: impl AsRef<Path>) -> Result<SignalBridge> {
        if self.settings.mode == BrokerMode::Inert {
            tracing::debug!(path = %path.as_ref().display(), "inert hub, trigger file not watched");
            return Ok(SignalBridge::idle(&self.settings.signal_name));
        }

        let (watcher, signals) = SignalWatcher::new(self.settings.debounce())?;
        watcher.watch(path).await?;

        let bridge = SignalBridge::attach(&self.settings.signal_name, signals, self.broker());
        Ok(bridge.with_watcher(watcher))
    }

    /// Watch the trigger file named by the `watch_path` setting, if any.
    ///
    /// Returns `Ok(None)` when no path is configured or the hub is inert.
    ///
    /// # Errors
    ///
    /// Same as [`watch_signal`](Self::watch_signal).
    #[cfg(feature = "file-watch")]
    pub async fn watch_configured(&self) -> Result<Option<SignalBridge>> {
        match (&self.settings.watch_path, self.settings.mode) {
            (Some(path), BrokerMode::Live) => self.watch_signal(path).await.map(Some),
            _ => Ok(None),
        }
    }
}

impl fmt::Debug for Hub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hub")
            .field("mode", &self.settings.mode)
            .field("gate", &self.gate)
            .field("events", &self.current_count())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// The process-wide hub.
///
/// Created lazily on first access from `HOTSWAP_INJECT_*` environment
/// settings, unless [`install_global`] ran first. Invalid settings fall back
/// to the defaults with a warning, so this never fails.
pub fn global() -> &'static Hub {
    GLOBAL.get_or_init(|| {
        let settings = Settings::from_env().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "invalid injection settings, using defaults");
            Settings::default()
        });
        Hub::builder().with_settings(settings).build()
    })
}

/// Install `hub` as the process-wide hub.
///
/// # Errors
///
/// Returns [`InjectError::AlreadyInitialized`] if the global hub already
/// exists, either from an earlier install or from a call to [`global`].
pub fn install_global(hub: Hub) -> Result<()> {
    GLOBAL.set(hub).map_err(|_| InjectError::AlreadyInitialized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::FnCapability;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_live_hub_round_trip() {
        let hub = Hub::builder().with_mode(BrokerMode::Live).build();
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&hits);
        let handle = hub.subscribe(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        hub.notify();
        hub.notify();
        hub.notify();
        assert_eq!(hits.load(Ordering::SeqCst), 3);
        assert_eq!(hub.current_count(), 3);

        drop(handle);
        hub.notify();
        assert_eq!(hits.load(Ordering::SeqCst), 3);
        assert_eq!(hub.current_count(), 4);
    }

    #[test]
    fn test_inert_hub_ignores_everything() {
        let hub = Hub::builder().with_mode(BrokerMode::Inert).build();
        let handle = hub.subscribe(|| panic!("inert hub must not call listeners"));

        assert!(handle.is_cancelled());
        hub.notify();
        assert_eq!(hub.current_count(), 0);
        assert_eq!(hub.listener_count(), 0);
    }

    #[test]
    fn test_ensure_loaded_runs_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let hub = Hub::builder()
            .with_mode(BrokerMode::Live)
            .with_capability(FnCapability::new("test", move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }))
            .build();

        hub.ensure_loaded();
        hub.ensure_loaded();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_owner_drop_unsubscribes() {
        struct View {
            _subscription: CancellationHandle,
        }

        let hub = Hub::builder().with_mode(BrokerMode::Live).build();
        let view = View {
            _subscription: hub.subscribe(|| {}),
        };
        assert_eq!(hub.listener_count(), 1);

        drop(view);
        assert_eq!(hub.listener_count(), 0);
    }

    #[test]
    fn test_global_is_a_singleton() {
        let first = global() as *const Hub;
        let second = global() as *const Hub;
        assert_eq!(first, second);

        let late = Hub::builder().build();
        assert!(matches!(
            install_global(late),
            Err(InjectError::AlreadyInitialized)
        ));
    }
}
