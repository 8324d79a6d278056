//! Startup settings.
//!
//! Settings are resolved once, before the hub is built. They decide whether
//! injection is live at all, where the capability bundle lives, and which
//! trigger file (if any) raises reload signals.

mod loader;

pub use loader::{BrokerMode, DEFAULT_ENV_PREFIX, DEFAULT_SIGNAL_NAME, Settings};
