//! Application service: delete plugins that are no longer declared.

use crate::application::ports::PluginStore;
use crate::domain::{Outcome, PluginState, SyncResult};

/// What orphan removal did.
#[derive(Debug, Default)]
pub struct OrphanReport {
    pub removed: Vec<SyncResult>,
    pub warnings: Vec<String>,
}

/// Remove each orphan's directory through the sandbox.
///
/// A failed removal leaves the directory in place and becomes a warning.
pub fn remove_orphans(store: &impl PluginStore, orphans: &[PluginState]) -> OrphanReport {
    let mut report = OrphanReport::default();
    for orphan in orphans {
        match store.remove_dir_all(&orphan.directory.path()) {
            Ok(()) => {
                tracing::debug!(plugin = %orphan.name, dir = %orphan.directory, "removed orphan");
                report
                    .removed
                    .push(SyncResult::new(orphan.name.clone(), Outcome::Removed));
            }
            Err(err) => {
                tracing::warn!(plugin = %orphan.name, error = %err, "cannot remove orphan");
                report.warnings.push(format!(
                    "cannot remove {} ({}): {err}",
                    orphan.name, orphan.directory
                ));
            }
        }
    }
    report
}
