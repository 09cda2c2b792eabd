//! Application configuration management.
//!
//! Settings are layered with figment, later layers winning:
//!
//! 1. Built-in defaults (`/var/lib/fintc`, store file `hashes`)
//! 2. `FINTC_*` environment variables (`FINTC_HOME`, `FINTC_STORE_FILE`,
//!    `FINTC_MMAP_THRESHOLD`)
//! 3. An explicit store path from the command line
//!    ([`Config::with_store_path`])

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use figment::providers::{Env, Serialized};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::scanner::hasher::DEFAULT_MMAP_THRESHOLD;

/// Storage home used when `FINTC_HOME` is not set.
pub const DEFAULT_HOME: &str = "/var/lib/fintc";

/// Store file name inside the storage home.
pub const DEFAULT_STORE_FILE: &str = "hashes";

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "FINTC_";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage home directory.
    pub home: PathBuf,

    /// Name of the store file inside `home`.
    pub store_file: String,

    /// Files at or above this many bytes are memory-mapped for hashing.
    pub mmap_threshold: u64,

    /// Explicit store file, bypassing `home`/`store_file`.
    #[serde(skip)]
    store_override: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            home: PathBuf::from(DEFAULT_HOME),
            store_file: DEFAULT_STORE_FILE.to_string(),
            mmap_threshold: DEFAULT_MMAP_THRESHOLD,
            store_override: None,
        }
    }
}

impl Config {
    /// Load defaults merged with the `FINTC_*` environment.
    ///
    /// # Errors
    ///
    /// Returns an error if an environment value has the wrong type, e.g. a
    /// non-numeric `FINTC_MMAP_THRESHOLD`.
    pub fn load() -> Result<Self> {
        let config: Self = Self::figment()
            .extract()
            .context("Invalid fintc configuration")?;
        log::debug!("Using hash store {}", config.store_path().display());
        Ok(config)
    }

    /// The figment the configuration is extracted from.
    #[must_use]
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Self::default())).merge(Env::prefixed(ENV_PREFIX))
    }

    /// Configuration rooted at an explicit storage home.
    #[must_use]
    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        Self {
            home: home.into(),
            ..Self::default()
        }
    }

    /// Use an explicit store file instead of `<home>/<store_file>`.
    #[must_use]
    pub fn with_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_override = Some(path.into());
        self
    }

    /// Location of the hash store file.
    #[must_use]
    pub fn store_path(&self) -> PathBuf {
        match &self.store_override {
            Some(path) => path.clone(),
            None => self.home.join(&self.store_file),
        }
    }

    /// Storage home directory.
    #[must_use]
    pub fn home(&self) -> &Path {
        &self.home
    }
}
