//! Built-in metrics for broker operations.
//!
//! Provides OpenTelemetry metrics tracking:
//! - Notifications and fan-out duration
//! - Subscriptions and cancellations
//! - Active listeners
//! - Time since the last reload event
//!
//! # Examples
//!
//! ```rust,no_run
//! use hotswap_inject::prelude::*;
//! use hotswap_inject::metrics::BrokerMetrics;
//! use opentelemetry::global;
//!
//! let hub = Hub::builder()
//!     .with_metrics(BrokerMetrics::new(global::meter("my-app")))
//!     .build();
//! ```

mod broker_metrics;

pub use broker_metrics::BrokerMetrics;
