//! Core broker types.

mod broker;
mod builder;
mod gate;
mod handle;
mod hub;
mod registry;

pub use broker::{Broker, EventBroker, InertBroker};
pub use builder::HubBuilder;
pub use gate::{CapabilityGate, CapabilityLoader};
pub use handle::CancellationHandle;
pub use hub::{Hub, global, install_global};
pub use registry::{Handler, Listener, ListenerId, ListenerRegistry};
