//! Application context: unified state passed to every command handler.
//!
//! Built once in `Cli::run()` from the global flags. Adding a cross-cutting
//! concern means one field here and zero command signature changes.

use std::path::PathBuf;

use anyhow::Result;
use tokio_util::sync::CancellationToken;

use crate::domain::PackConfig;
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::config::JsonConfigStore;
use crate::infra::git::GitCli;
use crate::output::{HumanRenderer, JsonRenderer, OutputContext, Renderer};

/// Output rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable terminal output (default).
    Human,
    /// Machine-readable JSON output.
    Json,
}

/// Output rendering flags.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Enable JSON output mode.
    pub json: bool,
}

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    /// Output rendering options.
    pub output: OutputFlags,
    /// Explicit `--config` path.
    pub config: Option<PathBuf>,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context. Always quiet in JSON mode so nothing but the
    /// document reaches stdout.
    pub output: OutputContext,
    /// Output rendering mode (human vs JSON).
    pub mode: OutputMode,
    /// Where the configuration comes from.
    pub config: JsonConfigStore,
    /// Cancelled on SIGINT; observed by the executor and every git process.
    pub cancel: CancellationToken,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    #[must_use]
    pub fn new(flags: AppFlags) -> Self {
        let mode = if flags.output.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        };
        let quiet = flags.output.quiet || flags.output.json;

        Self {
            output: OutputContext::new(flags.output.no_color, quiet),
            mode,
            config: JsonConfigStore::new(flags.config),
            cancel: CancellationToken::new(),
        }
    }

    /// Returns `true` when JSON output mode is active.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }

    /// Returns the appropriate `Renderer` variant for the current output mode.
    #[must_use]
    pub fn renderer(&self) -> Renderer<'_> {
        match self.mode {
            OutputMode::Human => Renderer::Human(HumanRenderer::new(&self.output)),
            OutputMode::Json => Renderer::Json(JsonRenderer),
        }
    }

    /// Load and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, malformed, or invalid.
    pub fn load_config(&self) -> Result<PackConfig> {
        self.config.load()
    }

    /// The git adapter for this run.
    ///
    /// Credential prompts are disabled so a private repository fails its own
    /// task instead of blocking a worker on the terminal.
    #[must_use]
    pub fn git(&self) -> GitCli<TokioCommandRunner> {
        GitCli::new(
            TokioCommandRunner::new(self.cancel.clone()).with_env("GIT_TERMINAL_PROMPT", "0"),
        )
    }
}
