//! Error types for hotswap-inject.
//!
//! The broker itself never fails: subscribing, notifying and cancelling are
//! infallible. Errors only come out of the adapters around it (settings,
//! signal watching, capability loaders, installing the global hub).

use std::path::PathBuf;

/// Result type alias for hotswap-inject operations.
pub type Result<T> = std::result::Result<T, InjectError>;

/// Errors that can occur outside the broker core.
#[derive(Debug, thiserror::Error)]
pub enum InjectError {
    /// The external reload capability could not be found or loaded.
    #[error("Capability '{name}' unavailable: {reason}")]
    CapabilityUnavailable {
        /// Name of the capability loader
        name: String,
        /// Why loading failed
        reason: String,
    },

    /// Startup settings could not be loaded or deserialized.
    #[error("Failed to load settings: {0}")]
    Settings(String),

    /// The signal watcher could not be created or could not watch a path.
    #[error("Signal watch error: {0}")]
    Watch(String),

    /// A path handed to a watcher or loader could not be resolved.
    #[error("Failed to resolve path '{}': {source}", path.display())]
    PathResolution {
        /// The path as given by the caller
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// The process-wide hub was already created or installed.
    #[error("Global hub is already initialized")]
    AlreadyInitialized,

    /// Failure reported by a host-provided loader such as
    /// [`FnCapability`](crate::capability::FnCapability).
    #[error("Injection error: {0}")]
    Other(String),
}

impl From<config::ConfigError> for InjectError {
    fn from(err: config::ConfigError) -> Self {
        InjectError::Settings(err.to_string())
    }
}
