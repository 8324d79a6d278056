//! Settings type and its file/environment loader.

use crate::error::Result;
use config::{Environment, File};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Prefix for environment overrides read by [`Settings::from_env`].
pub const DEFAULT_ENV_PREFIX: &str = "HOTSWAP_INJECT";

/// Identifier of the reload signal raised by the external capability.
pub const DEFAULT_SIGNAL_NAME: &str = "INJECTION_BUNDLE_NOTIFICATION";

/// Which broker variant the hub runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrokerMode {
    /// Subscriptions are stored and signals fan out.
    Live,
    /// Subscriptions are discarded and signals are ignored.
    Inert,
}

impl Default for BrokerMode {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            BrokerMode::Live
        } else {
            BrokerMode::Inert
        }
    }
}

/// Resolved startup settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Broker variant.
    pub mode: BrokerMode,
    /// Identifier of the inbound reload signal.
    pub signal_name: String,
    /// Where the capability bundle is expected, if anywhere.
    pub capability_path: Option<PathBuf>,
    /// Trigger file whose modification raises a reload signal.
    pub watch_path: Option<PathBuf>,
    /// Minimum time between two signals raised by the watcher.
    pub debounce_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: BrokerMode::default(),
            signal_name: DEFAULT_SIGNAL_NAME.to_string(),
            capability_path: None,
            watch_path: None,
            debounce_ms: 100,
        }
    }
}

impl Settings {
    /// Load settings from files and environment variables.
    ///
    /// Files are merged in order, later files overriding earlier ones; format
    /// is detected from the extension (YAML, TOML, JSON). Environment
    /// variables named `<PREFIX>_<KEY>` override every file. Missing keys
    /// keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be read or parsed, or a value has the
    /// wrong type.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use hotswap_inject::settings::Settings;
    ///
    /// # fn example() -> hotswap_inject::error::Result<()> {
    /// // HOTSWAP_INJECT_MODE=inert disables injection
    /// let settings = Settings::load(&["config/inject.yaml"], Some("HOTSWAP_INJECT"))?;
    /// println!("mode: {:?}", settings.mode);
    /// # Ok(())
    /// # }
    /// ```
    pub fn load<P>(files: &[P], env_prefix: Option<&str>) -> Result<Self>
    where
        P: AsRef<std::path::Path>,
    {
        let mut builder = config::Config::builder();

        for path in files {
            builder = builder.add_source(File::from(path.as_ref()));
        }

        if let Some(prefix) = env_prefix {
            builder = builder.add_source(
                Environment::with_prefix(prefix)
                    .prefix_separator("_")
                    .try_parsing(true),
            );
        }

        let settings = builder.build()?.try_deserialize::<Settings>()?;
        tracing::debug!(mode = ?settings.mode, signal = %settings.signal_name, "settings loaded");
        Ok(settings)
    }

    /// Load settings from `HOTSWAP_INJECT_*` environment variables only.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable holds a value of the wrong type.
    pub fn from_env() -> Result<Self> {
        Self::load::<PathBuf>(&[], Some(DEFAULT_ENV_PREFIX))
    }

    /// Debounce window as a [`Duration`].
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
