//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, or `std::process`.
//! All functions are synchronous and take data in, returning data out.

pub mod config;
pub mod digest;
pub mod error;
pub mod outcome;
pub mod plan;
pub mod plugin;

pub use config::{PackConfig, RawConfig};
pub use digest::{BranchInfo, Digest};
pub use error::{BranchError, ConfigError, PluginError, SandboxError};
pub use outcome::{Move, Outcome, OutcomeKind, SyncReport, SyncResult, Tally};
pub use plan::{Action, ReinstallReason};
pub use plugin::{PackDir, PluginDir, PluginSpec, PluginState};
