//! Per-spec decision procedure.
//!
//! Pure: compares one declared spec with what the scan found and names the
//! action to take. The reconciler executes these actions; `packsync plan`
//! only prints them.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::Serialize;

use crate::domain::outcome::Move;
use crate::domain::plugin::{PluginSpec, PluginState};

/// Why an existing plugin must be deleted and cloned again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum ReinstallReason {
    UrlChanged { from: String, to: String },
    BranchChanged { from: String, to: String },
}

impl fmt::Display for ReinstallReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UrlChanged { .. } => f.write_str("repo URL changed"),
            Self::BranchChanged { from, to } => {
                write!(f, "switching from branch {from} to {to}")
            }
        }
    }
}

/// What the reconciler will do for one spec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Nothing on disk: clone.
    Install,
    /// URL or branch differs: remove and clone.
    Reinstall { reason: ReinstallReason },
    /// Same repository: move if needed, then fetch unless pinned.
    Refresh { relocate: Option<Move>, pinned: bool },
}

/// Classify one spec against its discovered state.
#[must_use]
pub fn plan(state: Option<&PluginState>, spec: &PluginSpec) -> Action {
    let Some(state) = state else {
        return Action::Install;
    };

    if state.url != spec.url {
        return Action::Reinstall {
            reason: ReinstallReason::UrlChanged {
                from: state.url.clone(),
                to: spec.url.clone(),
            },
        };
    }
    if state.branch != spec.branch {
        return Action::Reinstall {
            reason: ReinstallReason::BranchChanged {
                from: state.branch.clone(),
                to: spec.branch.clone(),
            },
        };
    }

    let wanted = spec.pack_dir();
    let relocate = (state.directory.pack != wanted).then_some(Move {
        from: state.directory.pack,
        to: wanted,
    });
    Action::Refresh {
        relocate,
        pinned: spec.pinned,
    }
}

/// Discovered plugins that no spec declares, sorted by name.
#[must_use]
pub fn find_orphans<'a>(
    states: &'a HashMap<String, PluginState>,
    specs: &[PluginSpec],
) -> Vec<&'a PluginState> {
    let declared: HashSet<&str> = specs.iter().map(|s| s.name.as_str()).collect();
    let mut orphans: Vec<&PluginState> = states
        .values()
        .filter(|state| !declared.contains(state.name.as_str()))
        .collect();
    orphans.sort_by(|a, b| a.name.cmp(&b.name));
    orphans
}
