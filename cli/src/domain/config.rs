//! Domain types and validators for packsync configuration.
//!
//! Pure functions only: no I/O, no async, no filesystem access.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::domain::error::ConfigError;
use crate::domain::plan::find_orphans;
use crate::domain::plugin::{PluginSpec, PluginState};

// ── Constants ────────────────────────────────────────────────────────────────

/// First `dataDir` segment that stands for the user's home directory.
pub const HOME_PLACEHOLDER: &str = "HOME";

/// Default config file name, relative to the home directory.
pub const DEFAULT_CONFIG_FILE: &str = ".packsync.json";

// ── Config schema ────────────────────────────────────────────────────────────

/// Configuration as it appears on disk.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawConfig {
    /// Path segments of the plugin root, joined in order.
    #[serde(rename = "dataDir")]
    pub data_dir: Vec<String>,
    pub plugins: Vec<PluginSpec>,
}

/// Validated configuration handed to the sync engine.
#[derive(Debug, Clone)]
pub struct PackConfig {
    /// Directory holding `start/` and `opt/`.
    pub data_dir: PathBuf,
    pub plugins: Vec<PluginSpec>,
    /// One message per declared entry that was dropped.
    pub skipped: Vec<String>,
    /// Names of dropped entries. Installed trees with these names are kept.
    pub reserved: HashSet<String>,
}

impl PackConfig {
    /// Installed plugins to delete, sorted by name.
    ///
    /// A tree named by a dropped entry is neither synced nor removed.
    #[must_use]
    pub fn orphans<'a>(&self, states: &'a HashMap<String, PluginState>) -> Vec<&'a PluginState> {
        find_orphans(states, &self.plugins)
            .into_iter()
            .filter(|state| !self.reserved.contains(&state.name))
            .collect()
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Resolve `dataDir` segments, substituting the home placeholder.
///
/// # Errors
///
/// Returns an error if the segments are empty or the placeholder is used
/// without a known home directory.
pub fn resolve_data_dir(segments: &[String], home: Option<&Path>) -> Result<PathBuf, ConfigError> {
    let mut path = PathBuf::new();
    for (i, segment) in segments.iter().enumerate() {
        if i == 0 && segment == HOME_PLACEHOLDER {
            path.push(home.ok_or(ConfigError::NoHome(HOME_PLACEHOLDER))?);
        } else {
            path.push(segment);
        }
    }
    if path.as_os_str().is_empty() {
        return Err(ConfigError::MissingDataDir);
    }
    Ok(path)
}

/// Why a declared plugin entry cannot be used, if it cannot.
#[must_use]
pub fn spec_problem(spec: &PluginSpec) -> Option<&'static str> {
    if spec.url.is_empty() || spec.name.is_empty() || spec.branch.is_empty() {
        return Some("url, name, and branch are required");
    }
    if !is_plain_name(&spec.name) {
        return Some("name must be a single path component");
    }
    None
}

/// A plugin name must be one ordinary path component.
#[must_use]
pub fn is_plain_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains('\\')
        && !name.contains('\0')
}

/// Validate a raw configuration.
///
/// Unusable plugin entries are skipped and reported in
/// [`PackConfig::skipped`]; duplicate names are fatal.
///
/// # Errors
///
/// Returns an error if the data directory cannot be resolved or a plugin
/// name is declared twice.
pub fn validate(raw: RawConfig, home: Option<&Path>) -> Result<PackConfig, ConfigError> {
    let data_dir = resolve_data_dir(&raw.data_dir, home)?;

    let mut seen = HashSet::new();
    let mut plugins = Vec::with_capacity(raw.plugins.len());
    let mut skipped = Vec::new();
    let mut reserved = HashSet::new();
    for spec in raw.plugins {
        if let Some(problem) = spec_problem(&spec) {
            skipped.push(format!("skipping plugin entry {:?}: {problem}", spec.name));
            if is_plain_name(&spec.name) {
                reserved.insert(spec.name);
            }
            continue;
        }
        if !seen.insert(spec.name.clone()) {
            return Err(ConfigError::DuplicatePlugin(spec.name));
        }
        plugins.push(spec);
    }

    Ok(PackConfig {
        data_dir,
        plugins,
        skipped,
        reserved,
    })
}
