//! Loader used when injection is disabled.

use crate::core::CapabilityLoader;
use crate::error::Result;

/// A loader that succeeds without doing anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCapability;

impl CapabilityLoader for NoopCapability {
    fn load(&self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> String {
        "noop".to_string()
    }
}
