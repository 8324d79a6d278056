//! Broker metrics tracking using OpenTelemetry.

use opentelemetry::metrics::{Counter, Gauge, Histogram, Meter};
use std::sync::Arc;
use std::time::Instant;

/// Metrics collector for broker operations.
///
/// Tracks notifications, fan-out latency, subscription churn and listener
/// counts using OpenTelemetry metrics.
///
/// # Examples
///
/// ```rust,no_run
/// use hotswap_inject::metrics::BrokerMetrics;
/// use opentelemetry::global;
///
/// let meter = global::meter("hotswap-inject");
/// let metrics = BrokerMetrics::new(meter);
///
/// let timer = metrics.start_fanout();
/// // ... invoke listeners ...
/// metrics.record_fanout(timer, 3);
/// ```
#[derive(Clone)]
pub struct BrokerMetrics {
    notifications: Counter<u64>,
    fanout_duration: Histogram<f64>,
    subscriptions: Counter<u64>,
    cancellations: Counter<u64>,
    active_listeners: Gauge<i64>,
    event_age_seconds: Gauge<i64>,
    last_event: Arc<parking_lot::Mutex<Option<Instant>>>,
}

impl BrokerMetrics {
    /// Create a new metrics collector with the provided meter.
    pub fn new(meter: Meter) -> Self {
        let notifications = meter
            .u64_counter("hotswap_inject.notifications")
            .with_description("Number of reload events fanned out")
            .build();

        let fanout_duration = meter
            .f64_histogram("hotswap_inject.fanout.duration")
            .with_description("Time spent invoking listeners for one event, in seconds")
            .with_unit("s")
            .build();

        let subscriptions = meter
            .u64_counter("hotswap_inject.subscriptions")
            .with_description("Number of listeners registered")
            .build();

        let cancellations = meter
            .u64_counter("hotswap_inject.cancellations")
            .with_description("Number of listeners removed by their handle")
            .build();

        let active_listeners = meter
            .i64_gauge("hotswap_inject.listeners.active")
            .with_description("Number of registered listeners")
            .build();

        let event_age_seconds = meter
            .i64_gauge("hotswap_inject.event.age")
            .with_description("Time since the last reload event in seconds")
            .with_unit("s")
            .build();

        Self {
            notifications,
            fanout_duration,
            subscriptions,
            cancellations,
            active_listeners,
            event_age_seconds,
            last_event: Arc::new(parking_lot::Mutex::new(None)),
        }
    }

    /// Start timing a fan-out.
    ///
    /// Pass the returned `Instant` to [`record_fanout`](Self::record_fanout).
    pub fn start_fanout(&self) -> Instant {
        self.notifications.add(1, &[]);
        Instant::now()
    }

    /// Record a completed fan-out over `listeners` listeners.
    pub fn record_fanout(&self, start: Instant, listeners: usize) {
        self.fanout_duration
            .record(start.elapsed().as_secs_f64(), &[]);
        self.active_listeners.record(listeners as i64, &[]);
        *self.last_event.lock() = Some(Instant::now());
    }

    /// Record a new subscription; `listeners` is the count after it.
    pub fn record_subscribe(&self, listeners: usize) {
        self.subscriptions.add(1, &[]);
        self.active_listeners.record(listeners as i64, &[]);
    }

    /// Record a cancellation; `listeners` is the count after it.
    pub fn record_cancel(&self, listeners: usize) {
        self.cancellations.add(1, &[]);
        self.active_listeners.record(listeners as i64, &[]);
    }

    /// When the last fan-out completed, if any.
    pub fn last_event(&self) -> Option<Instant> {
        *self.last_event.lock()
    }

    /// Update the event age gauge.
    ///
    /// Does nothing until the first event has been fanned out. Call this
    /// periodically to see how long the process has gone without a reload.
    pub fn update_event_age(&self) {
        if let Some(last) = *self.last_event.lock() {
            self.event_age_seconds
                .record(last.elapsed().as_secs() as i64, &[]);
        }
    }
}
