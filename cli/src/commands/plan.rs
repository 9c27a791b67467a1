//! Plan command: show what a sync would do.

use std::collections::HashMap;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::app::AppContext;
use crate::application::ports::ProgressReporter as _;
use crate::application::services::executor::Executor;
use crate::application::services::plan::{classify, plan_sync};
use crate::commands::JobsArgs;
use crate::infra::sandbox::PluginRoot;
use crate::output::TerminalReporter;

/// Run the plan command.
///
/// A missing plugin directory is not an error here: every plugin would be
/// installed, and nothing is created.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or an existing
/// plugin directory cannot be opened.
pub async fn run(app: &AppContext, args: &JobsArgs) -> Result<ExitCode> {
    let config = app.load_config()?;

    let plan = if config.data_dir.is_dir() {
        let root = PluginRoot::open(&config.data_dir).with_context(|| {
            format!("cannot open plugin directory {}", config.data_dir.display())
        })?;
        let executor = Executor::new(args.jobs, app.cancel.clone());
        let reporter = TerminalReporter::new(&app.output);
        reporter.step("scanning installed plugins...");
        plan_sync(&Arc::new(root), &Arc::new(app.git()), &executor, &config).await
    } else {
        classify(&HashMap::new(), &config)
    };

    app.renderer().render_plan(&plan)?;
    Ok(if plan.warnings.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
