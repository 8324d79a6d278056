//! # hotswap-inject
//!
//! Process-wide reload notifications for hot code injection.
//!
//! ## Overview
//!
//! When an external reloader swaps code into a running process it raises a
//! signal. `hotswap-inject` turns that signal into callbacks:
//! - A [`CapabilityGate`](core::CapabilityGate) loads the external reload
//!   capability exactly once per process, best effort
//! - An [`EventBroker`](core::EventBroker) counts signals and fans each one out
//!   to every registered listener, in subscription order
//! - Every subscription returns a [`CancellationHandle`](core::CancellationHandle)
//!   that unsubscribes when dropped
//!
//! ## Quick Start
//!
//! ```rust
//! use hotswap_inject::prelude::*;
//!
//! struct Editor {
//!     _reload: CancellationHandle,
//! }
//!
//! let hub = Hub::builder().with_mode(BrokerMode::Live).build();
//! hub.ensure_loaded();
//!
//! let editor = Editor {
//!     _reload: hub.subscribe(|| println!("redrawing after reload")),
//! };
//!
//! hub.notify();
//! assert_eq!(hub.current_count(), 1);
//!
//! // Dropping the owner drops the handle, which unsubscribes.
//! drop(editor);
//! assert_eq!(hub.listener_count(), 0);
//! ```
//!
//! Most programs use the process-wide hub from [`global()`], configured from
//! `HOTSWAP_INJECT_*` environment variables. Setting
//! `HOTSWAP_INJECT_MODE=inert` (the default in release builds) swaps in a
//! broker that discards every subscription.
//!
//! ## Feature Flags
//!
//! - `file-watch` (default): trigger-file watcher and tokio signal bridge
//! - `metrics`: OpenTelemetry instruments for the broker

#![warn(missing_docs, rust_2024_compatibility)]
#![deny(unsafe_code)]

pub mod capability;
pub mod core;
pub mod error;
pub mod settings;

#[cfg(feature = "file-watch")]
pub mod notify;

#[cfg(feature = "metrics")]
pub mod metrics;

pub use crate::core::{global, install_global};

/// Convenient re-exports for common usage patterns.
pub mod prelude {
    pub use crate::core::{Broker, CancellationHandle, Hub, HubBuilder, global};
    pub use crate::error::{InjectError, Result};
    pub use crate::settings::{BrokerMode, Settings};

    #[cfg(feature = "file-watch")]
    pub use crate::notify::SignalBridge;
}
