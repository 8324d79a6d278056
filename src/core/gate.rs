//! Exactly-once loading of the external reload capability.

use crate::error::Result;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

/// Something that makes the external reload capability available.
///
/// Implement this to plug in however the host locates and loads the
/// capability. See [`crate::capability`] for the built-in loaders.
pub trait CapabilityLoader: Send + Sync {
    /// Try to load the capability.
    ///
    /// # Errors
    ///
    /// Returns an error if the capability is missing or cannot be loaded. The
    /// gate logs and discards it.
    fn load(&self) -> Result<()>;

    /// Get a human-readable name for this loader (for logging/debugging).
    fn name(&self) -> String;
}

/// Gate that runs its loader at most once.
///
/// The first call to [`ensure_loaded`](Self::ensure_loaded) runs the loader;
/// every later call, including concurrent and re-entrant ones, returns
/// immediately. Failures are absorbed: a missing capability only means the
/// broker will never receive a signal.
pub struct CapabilityGate {
    loader: Box<dyn CapabilityLoader>,
    attempted: AtomicBool,
}

impl CapabilityGate {
    /// Create a gate around a loader.
    pub fn new<L: CapabilityLoader + 'static>(loader: L) -> Self {
        Self::from_boxed(Box::new(loader))
    }

    pub(crate) fn from_boxed(loader: Box<dyn CapabilityLoader>) -> Self {
        Self {
            loader,
            attempted: AtomicBool::new(false),
        }
    }

    /// Load the capability if nobody has tried yet.
    ///
    /// Only the first caller runs the loader. Every other caller returns at
    /// once, even while that first load is still in progress on another
    /// thread, so returning from this method does not mean the capability is
    /// ready. Callers never block, which keeps a loader that calls back into
    /// the gate from deadlocking.
    pub fn ensure_loaded(&self) {
        if self
            .attempted
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }

        match self.loader.load() {
            Ok(()) => tracing::debug!(loader = %self.loader.name(), "reload capability loaded"),
            Err(e) => tracing::debug!(
                loader = %self.loader.name(),
                error = %e,
                "reload capability unavailable, reload signals disabled"
            ),
        }
    }

    /// Name of the underlying loader.
    pub fn loader_name(&self) -> String {
        self.loader.name()
    }
}

impl fmt::Debug for CapabilityGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityGate")
            .field("loader", &self.loader.name())
            .finish()
    }
}
