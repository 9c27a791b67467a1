//! Sync command: reconcile the plugin directory with the configuration.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::app::AppContext;
use crate::application::services::executor::Executor;
use crate::application::services::sync::sync;
use crate::commands::JobsArgs;
use crate::domain::SyncReport;
use crate::infra::sandbox::PluginRoot;
use crate::output::TerminalReporter;

/// Run the sync command.
///
/// # Errors
///
/// Returns an error for setup failures: unreadable configuration or a plugin
/// directory that cannot be created.
pub async fn run(app: &AppContext, args: &JobsArgs) -> Result<ExitCode> {
    let config = app.load_config()?;
    let root = PluginRoot::create(&config.data_dir).with_context(|| {
        format!("cannot open plugin directory {}", config.data_dir.display())
    })?;
    tracing::debug!(root = %root.path().display(), jobs = args.jobs.get(), "starting sync");

    let executor = Executor::new(args.jobs, app.cancel.clone());
    let report = {
        let reporter = TerminalReporter::new(&app.output);
        sync(Arc::new(root), Arc::new(app.git()), &executor, &config, &reporter).await?
    };
    if app.cancel.is_cancelled() {
        app.output.error("interrupted; unfinished plugins are reported as failed");
    }

    app.renderer().render_report(&report)?;
    Ok(exit_code(&report))
}

/// Success only when nothing failed and nothing was warned about.
#[must_use]
pub fn exit_code(report: &SyncReport) -> ExitCode {
    if report.is_clean() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
