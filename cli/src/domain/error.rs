//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, or `std::process`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

// ── Sandbox errors ────────────────────────────────────────────────────────────

/// A sandboxed filesystem call was refused or failed.
///
/// `Absolute` and `Escapes` are containment violations: they are raised
/// before any system call is issued.
#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("refusing absolute path {}", .0.display())]
    Absolute(PathBuf),

    #[error("path {} resolves outside the plugin root", .0.display())]
    Escapes(PathBuf),

    #[error("{op} {}: {source}", .path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl SandboxError {
    /// Returns `true` for containment violations (as opposed to I/O failures).
    #[must_use]
    pub fn is_violation(&self) -> bool {
        matches!(self, Self::Absolute(_) | Self::Escapes(_))
    }
}

// ── Branch metadata errors ────────────────────────────────────────────────────

/// Errors raised while determining the branch and digest of a working tree.
#[derive(Debug, Error)]
pub enum BranchError {
    /// HEAD names a commit rather than a branch.
    #[error("repository is in detached HEAD state")]
    Detached,

    #[error("cannot read {path}: {source}")]
    Unreadable {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("malformed repository metadata: {0}")]
    Malformed(String),

    #[error("git metadata query failed: {0}")]
    Query(String),

    #[error(transparent)]
    Sandbox(#[from] SandboxError),
}

// ── Configuration errors ──────────────────────────────────────────────────────

/// Errors that make a configuration unusable. All are fatal setup errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot parse config {}: {source}", .path.display())]
    Unparseable {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("dataDir is required in configuration")]
    MissingDataDir,

    #[error("cannot determine home directory for the {0:?} placeholder")]
    NoHome(&'static str),

    #[error("plugin {0:?} is declared more than once")]
    DuplicatePlugin(String),
}

// ── Per-plugin errors ─────────────────────────────────────────────────────────

/// Errors scoped to a single plugin's reconciliation.
#[derive(Debug, Error)]
pub enum PluginError {
    #[error(
        "{0} already exists and is not empty; remove it or repair its git metadata, then run again"
    )]
    DestinationPopulated(String),

    #[error("cancelled before completion")]
    Cancelled,
}
