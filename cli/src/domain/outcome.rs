//! Per-plugin outcomes and the run-level aggregate.

use std::fmt;

use serde::Serialize;

use crate::domain::digest::Digest;
use crate::domain::plugin::PackDir;

/// A completed relocation between pack directories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Move {
    pub from: PackDir,
    pub to: PackDir,
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}→{}", self.from, self.to)
    }
}

/// Flat classification of an [`Outcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeKind {
    Installed,
    Reinstalled,
    Moved,
    Updated,
    Pinned,
    Unchanged,
    Removed,
    Error,
}

impl OutcomeKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Installed => "installed",
            Self::Reinstalled => "reinstalled",
            Self::Moved => "moved",
            Self::Updated => "updated",
            Self::Pinned => "pinned",
            Self::Unchanged => "unchanged",
            Self::Removed => "removed",
            Self::Error => "error",
        }
    }
}

/// What happened to one plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Outcome {
    Installed,
    Reinstalled {
        reason: String,
    },
    /// The fetch changed HEAD. `moved` is set when a relocation preceded it.
    Updated {
        from: Digest,
        to: Digest,
        moved: Option<Move>,
    },
    /// Relocated; the fetch found nothing new.
    Moved {
        moved: Move,
    },
    /// No fetch attempted. `moved` is set when a relocation happened anyway.
    Pinned {
        moved: Option<Move>,
    },
    Unchanged,
    Removed,
    #[serde(rename = "error")]
    Failed {
        cause: String,
    },
}

impl Outcome {
    /// Wrap an error chain as a failed outcome.
    #[must_use]
    pub fn failed(err: &anyhow::Error) -> Self {
        Self::Failed {
            cause: format!("{err:#}"),
        }
    }

    #[must_use]
    pub fn kind(&self) -> OutcomeKind {
        match self {
            Self::Installed => OutcomeKind::Installed,
            Self::Reinstalled { .. } => OutcomeKind::Reinstalled,
            Self::Updated { .. } => OutcomeKind::Updated,
            Self::Moved { .. } => OutcomeKind::Moved,
            Self::Pinned { .. } => OutcomeKind::Pinned,
            Self::Unchanged => OutcomeKind::Unchanged,
            Self::Removed => OutcomeKind::Removed,
            Self::Failed { .. } => OutcomeKind::Error,
        }
    }

    /// The relocation recorded by this outcome, if any.
    #[must_use]
    pub fn relocation(&self) -> Option<Move> {
        match self {
            Self::Updated { moved, .. } | Self::Pinned { moved } => *moved,
            Self::Moved { moved } => Some(*moved),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Outcome of one plugin, keyed by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncResult {
    pub plugin: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl SyncResult {
    #[must_use]
    pub fn new(plugin: impl Into<String>, outcome: Outcome) -> Self {
        Self {
            plugin: plugin.into(),
            outcome,
        }
    }
}

/// Count of each outcome kind plus warnings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub installed: usize,
    pub reinstalled: usize,
    pub moved: usize,
    pub updated: usize,
    pub pinned: usize,
    pub unchanged: usize,
    pub removed: usize,
    pub errors: usize,
    pub warnings: usize,
}

impl Tally {
    fn record(&mut self, kind: OutcomeKind) {
        let slot = match kind {
            OutcomeKind::Installed => &mut self.installed,
            OutcomeKind::Reinstalled => &mut self.reinstalled,
            OutcomeKind::Moved => &mut self.moved,
            OutcomeKind::Updated => &mut self.updated,
            OutcomeKind::Pinned => &mut self.pinned,
            OutcomeKind::Unchanged => &mut self.unchanged,
            OutcomeKind::Removed => &mut self.removed,
            OutcomeKind::Error => &mut self.errors,
        };
        *slot += 1;
    }

    /// Errors plus warnings. The run succeeds only when this is zero.
    #[must_use]
    pub fn problems(&self) -> usize {
        self.errors + self.warnings
    }
}

/// Everything a run produced.
///
/// Appended to only by the task draining the executor's result queue.
#[derive(Debug, Default, Serialize)]
pub struct SyncReport {
    pub results: Vec<SyncResult>,
    pub warnings: Vec<String>,
    #[serde(rename = "summary")]
    pub tally: Tally,
}

impl SyncReport {
    pub fn push_result(&mut self, result: SyncResult) {
        self.tally.record(result.outcome.kind());
        self.results.push(result);
    }

    pub fn push_warning(&mut self, warning: impl Into<String>) {
        self.tally.warnings += 1;
        self.warnings.push(warning.into());
    }

    /// `true` when no plugin failed and nothing was warned about.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.tally.problems() == 0
    }

    /// Result for one plugin, if any.
    #[must_use]
    pub fn get(&self, plugin: &str) -> Option<&SyncResult> {
        self.results.iter().find(|r| r.plugin == plugin)
    }

    /// Sort results by plugin name for stable presentation.
    pub fn sort(&mut self) {
        self.results.sort_by(|a, b| a.plugin.cmp(&b.plugin));
    }
}
