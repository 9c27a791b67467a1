//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`: never from `crate::infra`,
//! `crate::commands`, or `crate::output`.
//!
//! Every port is `Send + Sync` and every async method returns a `Send`
//! future, so services can fan work out across tokio worker threads.

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;

use anyhow::Result;

use crate::domain::{BranchError, BranchInfo, PackDir, PluginDir, SandboxError};

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
pub trait CommandRunner: Send + Sync {
    /// Run a program under a deadline and capture its output.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned, exceeds `timeout`,
    /// or is cancelled. In the last two cases the child must be killed, not
    /// left orphaned. A non-zero exit status is NOT an error at this level.
    fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> impl Future<Output = Result<Output>> + Send;
}

// ── Version Control Port ──────────────────────────────────────────────────────

/// The external version-control operations the engine needs.
///
/// Paths are absolute and have already passed the plugin root's containment
/// check.
pub trait VcsClient: Send + Sync {
    /// Partial clone of `url` at `branch` into `dest`.
    fn clone_branch(
        &self,
        url: &str,
        branch: &str,
        dest: &Path,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Fetch and merge, recursing into submodules.
    fn pull(&self, dir: &Path) -> impl Future<Output = Result<()>> + Send;

    /// The configured remote URL of the tree at `dir`.
    fn remote_url(&self, dir: &Path) -> impl Future<Output = Result<String>> + Send;

    /// Ask git itself for branch name and HEAD commit in one call.
    ///
    /// Used only when the metadata files cannot be read directly.
    fn head_info(
        &self,
        dir: &Path,
    ) -> impl Future<Output = std::result::Result<BranchInfo, BranchError>> + Send;
}

// ── Plugin Store Port ─────────────────────────────────────────────────────────

/// Filesystem access confined to the plugin root.
///
/// All path arguments are relative to the root. Implementations must reject
/// absolute paths and anything resolving outside the root (after `..` and
/// symlinks) before touching the filesystem.
pub trait PluginStore: Send + Sync {
    /// Create `start/` and `opt/` if missing.
    ///
    /// # Errors
    ///
    /// Returns an error if either directory cannot be created.
    fn ensure_pack_dirs(&self) -> std::result::Result<(), SandboxError>;

    /// Names of the entries under `pack` that look like git working trees.
    ///
    /// # Errors
    ///
    /// Returns an error if the pack directory cannot be listed.
    fn list_repositories(&self, pack: PackDir) -> std::result::Result<Vec<String>, SandboxError>;

    /// Raw bytes of `<dir>/.git/<file>`.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error; callers decide whether to fall back.
    fn read_git_file(&self, dir: &PluginDir, file: &str) -> io::Result<Vec<u8>>;

    /// Absolute, symlink-resolved path for handing to an external tool.
    ///
    /// # Errors
    ///
    /// Returns a containment error if `rel` escapes the root.
    fn resolve(&self, rel: &Path) -> std::result::Result<PathBuf, SandboxError>;

    /// `true` when `rel` exists and is a non-empty directory or a file.
    ///
    /// # Errors
    ///
    /// Returns an error on containment violations or unexpected I/O errors.
    fn is_populated(&self, rel: &Path) -> std::result::Result<bool, SandboxError>;

    /// Create `rel` and all missing parents.
    ///
    /// # Errors
    ///
    /// Returns an error on containment violations or I/O failure.
    fn create_dir_all(&self, rel: &Path) -> std::result::Result<(), SandboxError>;

    /// Rename `from` to `to`.
    ///
    /// # Errors
    ///
    /// Returns an error on containment violations or I/O failure.
    fn rename(&self, from: &Path, to: &Path) -> std::result::Result<(), SandboxError>;

    /// Recursively remove `rel`.
    ///
    /// # Errors
    ///
    /// Returns an error on containment violations or I/O failure.
    fn remove_dir_all(&self, rel: &Path) -> std::result::Result<(), SandboxError>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Synchronous.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
}
