//! Closure-backed loader.

use crate::core::CapabilityLoader;
use crate::error::Result;
use std::fmt;

/// Loader that delegates to a closure.
///
/// Useful when the host already knows how to bring the capability up.
///
/// # Examples
///
/// ```rust
/// use hotswap_inject::capability::FnCapability;
/// use hotswap_inject::core::CapabilityGate;
///
/// let gate = CapabilityGate::new(FnCapability::new("host", || Ok(())));
/// gate.ensure_loaded();
/// ```
pub struct FnCapability<F> {
    name: String,
    load: F,
}

impl<F> FnCapability<F>
where
    F: Fn() -> Result<()> + Send + Sync,
{
    /// Wrap `load` under the given name.
    pub fn new(name: impl Into<String>, load: F) -> Self {
        Self {
            name: name.into(),
            load,
        }
    }
}

impl<F> CapabilityLoader for FnCapability<F>
where
    F: Fn() -> Result<()> + Send + Sync,
{
    fn load(&self) -> Result<()> {
        (self.load)()
    }

    fn name(&self) -> String {
        format!("fn:{}", self.name)
    }
}

impl<F> fmt::Debug for FnCapability<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCapability")
            .field("name", &self.name)
            .finish()
    }
}
