//! Application service: discover plugins already on disk.
//!
//! Imports only from `crate::domain` and `crate::application`.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::application::ports::{PluginStore, VcsClient};
use crate::application::services::branch::branch_info;
use crate::application::services::executor::Executor;
use crate::domain::plugin::merge_states;
use crate::domain::{PackDir, PluginDir, PluginState};

/// Discovered state plus the warnings discovery produced.
#[derive(Debug, Default)]
pub struct ScanReport {
    pub states: HashMap<String, PluginState>,
    pub warnings: Vec<String>,
}

/// Build one [`PluginState`] per working tree under `start/` and `opt/`.
///
/// Entries whose metadata cannot be read are dropped with a warning, which
/// makes them look undeclared-on-disk to the reconciler. A name present in
/// both pack directories keeps its `start/` entry.
pub async fn scan<S, V>(store: &Arc<S>, vcs: &Arc<V>, executor: &Executor) -> ScanReport
where
    S: PluginStore + 'static,
    V: VcsClient + 'static,
{
    let mut report = ScanReport::default();
    let mut jobs = Vec::new();

    for pack in PackDir::ALL {
        match store.list_repositories(pack) {
            Ok(names) => {
                for name in names {
                    let dir = PluginDir::new(pack, name);
                    let job = read_state(Arc::clone(store), Arc::clone(vcs), dir.clone());
                    jobs.push((dir, job));
                }
            }
            Err(err) => {
                tracing::warn!(pack = %pack, error = %err, "cannot list pack directory");
                report.warnings.push(format!("cannot list {pack}/: {err}"));
            }
        }
    }

    let mut found = Vec::with_capacity(jobs.len());
    let mut skipped = Vec::new();
    for (dir, result) in executor.run(jobs).await {
        match result {
            Ok(Ok(state)) => found.push(state),
            Ok(Err(err)) => {
                tracing::warn!(plugin = %dir, error = %format!("{err:#}"), "skipping plugin");
                skipped.push(format!("skipping {dir}: {err:#}"));
            }
            Err(failure) => {
                tracing::warn!(plugin = %dir, error = %failure, "skipping plugin");
                skipped.push(format!("skipping {dir}: {failure}"));
            }
        }
    }
    skipped.sort();
    report.warnings.extend(skipped);

    let merged = merge_states(found);
    for dup in merged.shadowed {
        tracing::warn!(plugin = %dup.name, "duplicate plugin in start/ and opt/");
        report.warnings.push(format!(
            "duplicate plugin {} found in both start/ and opt/; ignoring {}",
            dup.name, dup.directory
        ));
    }
    report.states = merged.states;
    report
}

/// Remote URL and branch/digest of one tree, queried concurrently.
async fn read_state<S, V>(store: Arc<S>, vcs: Arc<V>, dir: PluginDir) -> Result<PluginState>
where
    S: PluginStore,
    V: VcsClient,
{
    let abs = store.resolve(&dir.path())?;
    let (url, info) = tokio::join!(
        vcs.remote_url(&abs),
        branch_info(store.as_ref(), vcs.as_ref(), &dir)
    );
    let url = url.context("cannot determine repo URL")?;
    let info = info.context("cannot determine branch")?;

    Ok(PluginState {
        name: dir.name.clone(),
        directory: dir,
        url,
        branch: info.branch,
        digest: info.digest,
    })
}
