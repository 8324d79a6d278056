//! Builder for constructing Hub instances.

use crate::capability::{NoopCapability, PathCapability};
use crate::core::{Broker, CapabilityGate, CapabilityLoader, EventBroker, Hub, InertBroker};
use crate::settings::{BrokerMode, Settings};
use std::sync::Arc;

#[cfg(feature = "metrics")]
use crate::metrics::BrokerMetrics;

/// Builder for constructing a [`Hub`].
///
/// Starts from [`Settings::default`]. The broker variant and the capability
/// loader are resolved once in [`build`](Self::build):
/// - `Inert` mode always gets an [`InertBroker`] and a [`NoopCapability`].
/// - `Live` mode gets an [`EventBroker`] and the explicit loader if one was
///   given, otherwise a [`PathCapability`] for `capability_path`, otherwise a
///   [`NoopCapability`].
///
/// # Examples
///
/// ```rust
/// use hotswap_inject::prelude::*;
/// use hotswap_inject::capability::PathCapability;
///
/// let hub = Hub::builder()
///     .with_mode(BrokerMode::Live)
///     .with_capability(PathCapability::new("/opt/reload/bundle"))
///     .build();
/// assert_eq!(hub.mode(), BrokerMode::Live);
/// ```
pub struct HubBuilder {
    settings: Settings,
    loader: Option<Box<dyn CapabilityLoader>>,
    #[cfg(feature = "metrics")]
    metrics: Option<BrokerMetrics>,
}

impl HubBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            settings: Settings::default(),
            loader: None,
            #[cfg(feature = "metrics")]
            metrics: None,
        }
    }

    /// Replace all settings.
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Choose the broker variant.
    pub fn with_mode(mut self, mode: BrokerMode) -> Self {
        self.settings.mode = mode;
        self
    }

    /// Use a specific capability loader (ignored in `Inert` mode).
    pub fn with_capability<L: CapabilityLoader + 'static>(mut self, loader: L) -> Self {
        self.loader = Some(Box::new(loader));
        self
    }

    /// Attach OpenTelemetry instruments to the live broker.
    #[cfg(feature = "metrics")]
    pub fn with_metrics(mut self, metrics: BrokerMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Build the hub.
    pub fn build(self) -> Hub {
        let mode = self.settings.mode;
        let (broker, loader): (Arc<dyn Broker>, Box<dyn CapabilityLoader>) = match mode {
            BrokerMode::Inert => (Arc::new(InertBroker), Box::new(NoopCapability)),
            BrokerMode::Live => {
                let broker = EventBroker::new();
                #[cfg(feature = "metrics")]
                let broker = match self.metrics {
                    Some(metrics) => broker.with_metrics(metrics),
                    None => broker,
                };

                let loader: Box<dyn CapabilityLoader> =
                    match (self.loader, &self.settings.capability_path) {
                        (Some(loader), _) => loader,
                        (None, Some(path)) => Box::new(PathCapability::new(path)),
                        (None, None) => Box::new(NoopCapability),
                    };
                (Arc::new(broker), loader)
            }
        };

        tracing::debug!(
            mode = ?mode,
            loader = %loader.name(),
            "injection hub built"
        );

        Hub::from_parts(CapabilityGate::from_boxed(loader), broker, self.settings)
    }
}

impl Default for HubBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::FnCapability;
    use std::path::PathBuf;

    #[test]
    fn test_default_settings() {
        let builder = HubBuilder::new();
        assert_eq!(builder.settings, Settings::default());
        assert!(builder.loader.is_none());
    }

    #[test]
    fn test_inert_mode_forces_noop_loader() {
        let hub = HubBuilder::new()
            .with_capability(FnCapability::new("host", || Ok(())))
            .with_mode(BrokerMode::Inert)
            .build();
        assert_eq!(hub.capability_name(), "noop");
    }

    #[test]
    fn test_live_mode_uses_capability_path() {
        let settings = Settings {
            mode: BrokerMode::Live,
            capability_path: Some(PathBuf::from("/opt/reload/bundle")),
            ..Settings::default()
        };
        let hub = HubBuilder::new().with_settings(settings).build();
        assert_eq!(hub.capability_name(), "path:/opt/reload/bundle");
    }

    #[test]
    fn test_explicit_loader_wins() {
        let settings = Settings {
            mode: BrokerMode::Live,
            capability_path: Some(PathBuf::from("/opt/reload/bundle")),
            ..Settings::default()
        };
        let hub = HubBuilder::new()
            .with_settings(settings)
            .with_capability(FnCapability::new("host", || Ok(())))
            .build();
        assert_eq!(hub.capability_name(), "fn:host");
    }

    #[test]
    fn test_missing_capability_does_not_affect_broker() {
        let settings = Settings {
            mode: BrokerMode::Live,
            capability_path: Some(PathBuf::from("/nonexistent/reload.bundle")),
            ..Settings::default()
        };
        let hub = HubBuilder::new().with_settings(settings).build();
        hub.ensure_loaded();

        let _handle = hub.subscribe(|| {});
        hub.notify();
        assert_eq!(hub.current_count(), 1);
    }
}
