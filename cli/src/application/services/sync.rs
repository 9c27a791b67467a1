//! Application service: one full reconciliation run.
//!
//! Order: prepare the pack directories, scan, then reconcile every declared
//! spec under the executor while orphans are removed on a blocking thread.
//! The report is assembled here, by the single task draining both.

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::application::ports::{PluginStore, ProgressReporter, VcsClient};
use crate::application::services::executor::{Executor, JobFailure};
use crate::application::services::orphans::remove_orphans;
use crate::application::services::reconcile::reconcile;
use crate::application::services::scan::{ScanReport, scan};
use crate::domain::{Outcome, PackConfig, PluginError, PluginState, SyncReport, SyncResult};

/// Run the whole reconciliation.
///
/// # Errors
///
/// Returns an error only for setup failures (the pack directories cannot be
/// created). Everything after that is reported per plugin.
pub async fn sync<S, V>(
    store: Arc<S>,
    vcs: Arc<V>,
    executor: &Executor,
    config: &PackConfig,
    reporter: &impl ProgressReporter,
) -> Result<SyncReport>
where
    S: PluginStore + 'static,
    V: VcsClient + 'static,
{
    store
        .ensure_pack_dirs()
        .context("cannot prepare plugin directory")?;

    reporter.step("scanning installed plugins...");
    let ScanReport {
        mut states,
        warnings,
    } = scan(&store, &vcs, executor).await;

    let mut report = SyncReport::default();
    for warning in config.skipped.iter().cloned().chain(warnings) {
        report.push_warning(warning);
    }

    let orphans: Vec<PluginState> = config
        .orphans(&states)
        .into_iter()
        .cloned()
        .collect();

    let jobs: Vec<_> = config
        .plugins
        .iter()
        .map(|spec| {
            let state = states.remove(&spec.name);
            let store = Arc::clone(&store);
            let vcs = Arc::clone(&vcs);
            let spec = spec.clone();
            let key = spec.name.clone();
            let job =
                async move { reconcile(store.as_ref(), vcs.as_ref(), state, &spec).await };
            (key, job)
        })
        .collect();

    reporter.step(&format!("syncing {} plugins...", config.plugins.len()));
    let orphan_store = Arc::clone(&store);
    let removal = tokio::task::spawn_blocking(move || remove_orphans(orphan_store.as_ref(), &orphans));
    let (results, removal) = tokio::join!(executor.run(jobs), removal);

    for (name, result) in results {
        report.push_result(match result {
            Ok(result) => result,
            Err(failure) => failed_job(name, failure),
        });
    }

    match removal {
        Ok(orphans) => {
            for removed in orphans.removed {
                report.push_result(removed);
            }
            for warning in orphans.warnings {
                report.push_warning(warning);
            }
        }
        Err(err) => {
            tracing::error!(error = %err, "orphan removal task failed");
            report.push_warning(format!("orphan removal did not complete: {err}"));
        }
    }

    report.sort();
    Ok(report)
}

fn failed_job(name: String, failure: JobFailure) -> SyncResult {
    let err = match failure {
        JobFailure::Cancelled => anyhow::Error::new(PluginError::Cancelled),
        JobFailure::Panicked(_) => anyhow::Error::new(failure),
    };
    tracing::warn!(plugin = %name, error = %err, "plugin task did not complete");
    SyncResult::new(name, Outcome::failed(&err))
}
