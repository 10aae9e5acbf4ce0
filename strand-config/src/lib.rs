#![deny(missing_docs)]
//! Application settings for strand.
//!
//! [`AppConfig`] is a plain value: build it from defaults, a JSON file, or
//! the environment. [`SharedConfig`] wraps one in a lock so many readers
//! can query it while a writer swaps in a new value. Construct it once at
//! process start and hand clones to whatever needs it.
//!
//! ```
//! use strand_config::{AppConfig, SharedConfig};
//!
//! let shared = SharedConfig::new(AppConfig::default());
//! assert_eq!(shared.seven_zip_path(), std::path::PathBuf::from("7z"));
//!
//! shared.replace(AppConfig::new("/opt/7zip/7zz"));
//! assert_eq!(shared.seven_zip_path().to_str(), Some("/opt/7zip/7zz"));
//! ```

use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable read by [`AppConfig::from_env`].
pub const SEVEN_ZIP_PATH_ENV: &str = "STRAND_SEVEN_ZIP_PATH";

const DEFAULT_SEVEN_ZIP: &str = "7z";

/// Errors loading configuration.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The config text is not valid JSON for [`AppConfig`].
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Application settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Path of the 7-Zip executable. A bare name is resolved through `PATH`.
    pub seven_zip_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            seven_zip_path: PathBuf::from(DEFAULT_SEVEN_ZIP),
        }
    }
}

impl AppConfig {
    /// Config pointing at the given 7-Zip executable.
    pub fn new(seven_zip_path: impl Into<PathBuf>) -> Self {
        Self {
            seven_zip_path: seven_zip_path.into(),
        }
    }

    /// Parse from JSON text. Missing keys take their defaults.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read and parse a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Defaults, overridden by `STRAND_SEVEN_ZIP_PATH` when set and
    /// non-empty.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through
    /// `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        match lookup(SEVEN_ZIP_PATH_ENV).filter(|v| !v.is_empty()) {
            Some(path) => {
                tracing::debug!(var = SEVEN_ZIP_PATH_ENV, "7-Zip path taken from environment");
                Self::new(path)
            }
            None => Self::default(),
        }
    }
}

/// A cloneable, lock-protected handle to the current [`AppConfig`].
///
/// Reads never observe a half-written value. A poisoned lock is recovered
/// rather than propagated.
#[derive(Debug, Clone, Default)]
pub struct SharedConfig {
    inner: Arc<RwLock<AppConfig>>,
}

impl SharedConfig {
    /// Share `config`.
    pub fn new(config: AppConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Current 7-Zip executable path.
    pub fn seven_zip_path(&self) -> PathBuf {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .seven_zip_path
            .clone()
    }

    /// Copy of the whole current config.
    pub fn snapshot(&self) -> AppConfig {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Swap in a new config, returning the previous one.
    pub fn replace(&self, config: AppConfig) -> AppConfig {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        tracing::info!(seven_zip_path = %config.seven_zip_path.display(), "config replaced");
        std::mem::replace(&mut *guard, config)
    }
}
