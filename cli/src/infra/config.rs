//! Loading the JSON configuration file from disk.

use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};

use crate::domain::config::{self, DEFAULT_CONFIG_FILE, PackConfig, RawConfig};
use crate::domain::ConfigError;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "PACKSYNC_CONFIG";

/// Reads and validates `~/.packsync.json` or an explicit override.
#[derive(Debug, Clone, Default)]
pub struct JsonConfigStore {
    explicit: Option<PathBuf>,
}

impl JsonConfigStore {
    /// Use `explicit` when set, else `PACKSYNC_CONFIG`, else the default file.
    #[must_use]
    pub fn new(explicit: Option<PathBuf>) -> Self {
        Self { explicit }
    }

    /// Where the configuration is read from.
    ///
    /// # Errors
    ///
    /// Returns an error if no override is given and the home directory is
    /// unknown.
    pub fn path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.explicit {
            return Ok(path.clone());
        }
        if let Some(val) = std::env::var_os(CONFIG_ENV).filter(|v| !v.is_empty()) {
            return Ok(PathBuf::from(val));
        }
        let home =
            dirs::home_dir().ok_or_else(|| anyhow!("cannot determine home directory"))?;
        Ok(home.join(DEFAULT_CONFIG_FILE))
    }

    /// Read, parse, and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or fails
    /// validation.
    pub fn load(&self) -> Result<PackConfig> {
        let path = self.path()?;
        let raw = read_raw(&path)?;
        let config = config::validate(raw, dirs::home_dir().as_deref())?;
        tracing::debug!(
            path = %path.display(),
            data_dir = %config.data_dir.display(),
            plugins = config.plugins.len(),
            "loaded configuration"
        );
        Ok(config)
    }
}

fn read_raw(path: &Path) -> Result<RawConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ConfigError::Unparseable {
        path: path.to_path_buf(),
        source,
    })
}
