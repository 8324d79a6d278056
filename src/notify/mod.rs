//! Inbound reload signals.
//!
//! The broker only needs to know that a reload happened. This module turns
//! external signals into [`Broker::notify`](crate::core::Broker::notify) calls:
//! [`SignalBridge`] forwards messages from any tokio channel, and
//! [`SignalWatcher`] produces such messages from trigger-file changes.

pub mod bridge;
pub mod watcher;

pub use bridge::SignalBridge;
pub use watcher::SignalWatcher;

pub use crate::settings::DEFAULT_SIGNAL_NAME;
