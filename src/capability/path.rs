//! Filesystem probe for the capability bundle.

use crate::core::CapabilityLoader;
use crate::error::{InjectError, Result};
use std::path::{Path, PathBuf};

/// Best-effort probe that a capability bundle exists on disk.
///
/// Succeeds when the path resolves to an existing file or directory. Actually
/// loading the bundle is left to the host; this loader only decides whether
/// there is anything to load.
///
/// # Examples
///
/// ```rust,no_run
/// use hotswap_inject::capability::PathCapability;
/// use hotswap_inject::core::CapabilityGate;
///
/// let gate = CapabilityGate::new(PathCapability::new("/Applications/Reloader.app/bundle"));
/// gate.ensure_loaded();
/// ```
#[derive(Debug, Clone)]
pub struct PathCapability {
    path: PathBuf,
}

impl PathCapability {
    /// Create a probe for `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The probed path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CapabilityLoader for PathCapability {
    fn load(&self) -> Result<()> {
        let resolved = self
            .path
            .canonicalize()
            .map_err(|e| InjectError::CapabilityUnavailable {
                name: self.name(),
                reason: e.to_string(),
            })?;

        tracing::debug!(path = %resolved.display(), "capability bundle found");
        Ok(())
    }

    fn name(&self) -> String {
        format!("path:{}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let bundle = temp_dir.path().join("reload.bundle");
        fs::write(&bundle, b"").unwrap();

        assert!(PathCapability::new(&bundle).load().is_ok());
    }

    #[test]
    fn test_existing_directory() {
        let temp_dir = TempDir::new().unwrap();
        assert!(PathCapability::new(temp_dir.path()).load().is_ok());
    }

    #[test]
    fn test_missing_path() {
        let result = PathCapability::new("/nonexistent/reload.bundle").load();
        assert!(matches!(
            result,
            Err(InjectError::CapabilityUnavailable { .. })
        ));
    }

    #[test]
    fn test_name() {
        let loader = PathCapability::new("/tmp/reload.bundle");
        assert_eq!(loader.name(), "path:/tmp/reload.bundle");
    }
}
