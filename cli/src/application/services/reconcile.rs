//! Application service: bring one declared plugin in line with disk.
//!
//! Imports only from `crate::domain` and `crate::application`.

use anyhow::{Context, Result, bail};

use crate::application::ports::{PluginStore, VcsClient};
use crate::application::services::branch::branch_info;
use crate::domain::plan::{Action, plan};
use crate::domain::{Move, Outcome, PluginDir, PluginError, PluginSpec, PluginState, SyncResult};

/// Classify and carry out the action for one spec.
///
/// Never fails: every error is folded into [`Outcome::Failed`] for this
/// plugin alone.
pub async fn reconcile(
    store: &impl PluginStore,
    vcs: &impl VcsClient,
    state: Option<PluginState>,
    spec: &PluginSpec,
) -> SyncResult {
    let outcome = match apply(store, vcs, state, spec).await {
        Ok(outcome) => outcome,
        Err(err) => {
            tracing::warn!(plugin = %spec.name, error = %format!("{err:#}"), "plugin failed");
            Outcome::failed(&err)
        }
    };
    tracing::debug!(plugin = %spec.name, outcome = outcome.kind().as_str(), "reconciled");
    SyncResult::new(spec.name.clone(), outcome)
}

async fn apply(
    store: &impl PluginStore,
    vcs: &impl VcsClient,
    state: Option<PluginState>,
    spec: &PluginSpec,
) -> Result<Outcome> {
    let action = plan(state.as_ref(), spec);
    match (action, state) {
        (Action::Install, _) => {
            install(store, vcs, spec).await?;
            Ok(Outcome::Installed)
        }
        (Action::Reinstall { reason }, Some(current)) => {
            tracing::debug!(plugin = %spec.name, %reason, "reinstalling");
            store
                .remove_dir_all(&current.directory.path())
                .with_context(|| format!("cannot remove {}", current.directory))?;
            install(store, vcs, spec).await?;
            Ok(Outcome::Reinstalled {
                reason: reason.to_string(),
            })
        }
        (Action::Refresh { relocate, pinned }, Some(current)) => {
            refresh(store, vcs, current, relocate, pinned).await
        }
        (action, None) => bail!("planned {action:?} without a discovered state"),
    }
}

/// Partial clone into the directory the spec's load flag implies.
async fn install(store: &impl PluginStore, vcs: &impl VcsClient, spec: &PluginSpec) -> Result<()> {
    let dir = spec.directory();
    let rel = dir.path();
    if store.is_populated(&rel)? {
        return Err(PluginError::DestinationPopulated(dir.to_string()).into());
    }
    let dest = store.resolve(&rel)?;
    vcs.clone_branch(&spec.url, &spec.branch, &dest)
        .await
        .with_context(|| format!("git clone into {dir} failed"))
}

/// Move if needed, then fetch unless pinned.
///
/// The move is applied to `state.directory` before any fetch starts.
async fn refresh(
    store: &impl PluginStore,
    vcs: &impl VcsClient,
    mut state: PluginState,
    relocate: Option<Move>,
    pinned: bool,
) -> Result<Outcome> {
    if let Some(mv) = relocate {
        let target = PluginDir::new(mv.to, state.name.clone());
        store
            .rename(&state.directory.path(), &target.path())
            .with_context(|| format!("cannot move {} to {target}", state.directory))?;
        tracing::debug!(plugin = %state.name, %mv, "moved");
        state.directory = target;
    }

    if pinned {
        return Ok(Outcome::Pinned { moved: relocate });
    }

    let abs = store.resolve(&state.directory.path())?;
    vcs.pull(&abs)
        .await
        .with_context(|| format!("git pull in {} failed", state.directory))?;
    let after = branch_info(store, vcs, &state.directory)
        .await
        .context("cannot read HEAD after update")?;

    if after.digest == state.digest {
        return Ok(match relocate {
            Some(moved) => Outcome::Moved { moved },
            None => Outcome::Unchanged,
        });
    }
    Ok(Outcome::Updated {
        from: state.digest,
        to: after.digest,
        moved: relocate,
    })
}
