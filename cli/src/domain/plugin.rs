//! Plugin specifications, discovered plugin state, and pack directories.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::digest::Digest;

/// The two pack subdirectories a plugin may live in.
///
/// The derived ordering is the scan tie-break: `Start` sorts before `Opt`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PackDir {
    /// Loaded at startup.
    Start,
    /// Loaded on demand with `:packadd`.
    Opt,
}

impl PackDir {
    /// Every pack directory, in scan order.
    pub const ALL: [Self; 2] = [Self::Start, Self::Opt];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Opt => "opt",
        }
    }

    /// Pack directory implied by a spec's optional-load flag.
    #[must_use]
    pub fn for_optional(opt: bool) -> Self {
        if opt { Self::Opt } else { Self::Start }
    }
}

impl fmt::Display for PackDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Root-relative location of one plugin: `<pack>/<name>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PluginDir {
    pub pack: PackDir,
    pub name: String,
}

impl PluginDir {
    #[must_use]
    pub fn new(pack: PackDir, name: impl Into<String>) -> Self {
        Self {
            pack,
            name: name.into(),
        }
    }

    /// Path relative to the plugin root.
    #[must_use]
    pub fn path(&self) -> PathBuf {
        Path::new(self.pack.as_str()).join(&self.name)
    }

    /// Path of a file inside this tree's `.git` directory.
    #[must_use]
    pub fn git_path(&self, file: &str) -> PathBuf {
        self.path().join(".git").join(file)
    }
}

impl fmt::Display for PluginDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.pack, self.name)
    }
}

/// A plugin as declared in the user's configuration. Read-only during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginSpec {
    pub url: String,
    pub name: String,
    pub branch: String,
    /// Install under `opt/` instead of `start/`.
    #[serde(default)]
    pub opt: bool,
    /// Never fetch updates; the plugin may still be moved.
    #[serde(default, rename = "pin")]
    pub pinned: bool,
}

impl PluginSpec {
    #[must_use]
    pub fn pack_dir(&self) -> PackDir {
        PackDir::for_optional(self.opt)
    }

    /// Where this plugin should live.
    #[must_use]
    pub fn directory(&self) -> PluginDir {
        PluginDir::new(self.pack_dir(), self.name.clone())
    }
}

/// A plugin as found on disk. Derived fresh each run, never persisted.
///
/// `directory` is the only field that changes after discovery, and only
/// through a successful move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginState {
    pub name: String,
    pub directory: PluginDir,
    pub url: String,
    pub branch: String,
    pub digest: Digest,
}

/// Outcome of merging the per-directory scans.
#[derive(Debug, Default)]
pub struct MergedStates {
    pub states: HashMap<String, PluginState>,
    /// States dropped because a plugin of the same name was already kept.
    pub shadowed: Vec<PluginState>,
}

/// Merge discovered states into one entry per name.
///
/// The tie-break does not depend on input order: a plugin under `start/`
/// always wins over one of the same name under `opt/`.
#[must_use]
pub fn merge_states(mut found: Vec<PluginState>) -> MergedStates {
    found.sort_by(|a, b| {
        a.directory
            .pack
            .cmp(&b.directory.pack)
            .then_with(|| a.name.cmp(&b.name))
    });

    let mut merged = MergedStates::default();
    for state in found {
        if merged.states.contains_key(&state.name) {
            merged.shadowed.push(state);
        } else {
            merged.states.insert(state.name.clone(), state);
        }
    }
    merged
}
