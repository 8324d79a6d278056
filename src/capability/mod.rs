//! Built-in [`CapabilityLoader`](crate::core::CapabilityLoader) implementations.

mod fn_loader;
mod noop;
mod path;

pub use fn_loader::FnCapability;
pub use noop::NoopCapability;
pub use path::PathCapability;
