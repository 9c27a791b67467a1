//! Application service: dry run of a sync.
//!
//! Scans like a real run, then reports what the reconciler would do without
//! touching anything.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use crate::application::ports::{PluginStore, VcsClient};
use crate::application::services::executor::Executor;
use crate::application::services::scan::scan;
use crate::domain::plan::{Action, plan};
use crate::domain::{PackConfig, PluginState};

/// The action for one declared plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedAction {
    pub plugin: String,
    #[serde(flatten)]
    pub action: Action,
}

/// Everything a sync would do.
#[derive(Debug, Default, Serialize)]
pub struct PlanReport {
    pub actions: Vec<PlannedAction>,
    /// Names that would be removed.
    pub orphans: Vec<String>,
    pub warnings: Vec<String>,
}

/// Scan the store and classify every declared plugin.
pub async fn plan_sync<S, V>(
    store: &Arc<S>,
    vcs: &Arc<V>,
    executor: &Executor,
    config: &PackConfig,
) -> PlanReport
where
    S: PluginStore + 'static,
    V: VcsClient + 'static,
{
    let scanned = scan(store, vcs, executor).await;
    let mut report = classify(&scanned.states, config);
    report.warnings.extend(scanned.warnings);
    report
}

/// Pure half of [`plan_sync`].
#[must_use]
pub fn classify(states: &HashMap<String, PluginState>, config: &PackConfig) -> PlanReport {
    let mut actions: Vec<PlannedAction> = config
        .plugins
        .iter()
        .map(|spec| PlannedAction {
            plugin: spec.name.clone(),
            action: plan(states.get(&spec.name), spec),
        })
        .collect();
    actions.sort_by(|a, b| a.plugin.cmp(&b.plugin));

    PlanReport {
        actions,
        orphans: config
            .orphans(states)
            .into_iter()
            .map(|s| s.name.clone())
            .collect(),
        warnings: config.skipped.clone(),
    }
}
