//! CLI argument parsing with clap derive

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;

use crate::app::{AppContext, AppFlags, OutputFlags};
use crate::commands;
use crate::logging::{self, Verbosity};
use crate::output::json;

/// Keep Vim/Neovim plugin packs in line with a declared list
#[derive(Parser)]
#[command(
    name = "packsync",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Configuration file [default: $PACKSYNC_CONFIG or ~/.packsync.json]
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Only print failures and warnings
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Print diagnostic logs to stderr
    #[arg(long, global = true)]
    pub debug: bool,

    /// Disable colored output (also disabled by a non-empty NO_COLOR)
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Install, update, move, and remove plugins to match the configuration
    Sync(commands::JobsArgs),

    /// Show what sync would do without changing anything
    Plan(commands::JobsArgs),

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails before producing a report.
    pub async fn run(self) -> Result<ExitCode> {
        let Cli {
            config,
            json,
            quiet,
            debug,
            no_color,
            command,
        } = self;
        logging::init(Verbosity::from_flags(quiet, debug));

        let app = AppContext::new(AppFlags {
            output: OutputFlags {
                no_color,
                quiet,
                json,
            },
            config,
        });
        let interrupt = cancel_on_interrupt(app.cancel.clone());

        let result = match command {
            Command::Sync(args) => commands::sync::run(&app, &args).await,
            Command::Plan(args) => commands::plan::run(&app, &args).await,
            Command::Version => commands::version::run(&app),
        };
        interrupt.abort();

        match result {
            Err(err) if app.is_json() => {
                println!("{}", json::format_error(&format!("{err:#}"), "SETUP_FAILED")?);
                Ok(ExitCode::FAILURE)
            }
            other => other,
        }
    }
}

/// Cancel `cancel` on the first Ctrl-C.
fn cancel_on_interrupt(cancel: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted; stopping in-flight git processes");
            cancel.cancel();
        }
    })
}
