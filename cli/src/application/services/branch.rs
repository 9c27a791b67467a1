//! Application service: branch and digest discovery for one working tree.
//!
//! Reads `.git/HEAD` and the ref it names directly, avoiding one subprocess
//! per plugin. Only when those reads fail for a reason other than a detached
//! HEAD (packed refs, a `.git` file pointing elsewhere) does it ask git.

use crate::application::ports::{PluginStore, VcsClient};
use crate::domain::digest::{self, BranchInfo, Digest};
use crate::domain::{BranchError, PluginDir};

/// Branch name and HEAD digest of the tree at `dir`.
///
/// # Errors
///
/// Returns [`BranchError::Detached`] without consulting git when HEAD is
/// detached; otherwise returns the fallback query's error.
pub async fn branch_info(
    store: &impl PluginStore,
    vcs: &impl VcsClient,
    dir: &PluginDir,
) -> Result<BranchInfo, BranchError> {
    match read_from_files(store, dir) {
        Ok(info) => Ok(info),
        Err(BranchError::Detached) => Err(BranchError::Detached),
        Err(err) => {
            tracing::debug!(plugin = %dir, error = %err, "direct ref read failed; asking git");
            let abs = store.resolve(&dir.path())?;
            vcs.head_info(&abs).await
        }
    }
}

/// The filesystem half of [`branch_info`].
///
/// # Errors
///
/// Returns an error if HEAD or the ref it names cannot be read, or if HEAD is
/// detached.
pub fn read_from_files(store: &impl PluginStore, dir: &PluginDir) -> Result<BranchInfo, BranchError> {
    let head = store
        .read_git_file(dir, "HEAD")
        .map_err(|source| BranchError::Unreadable {
            path: dir.git_path("HEAD").display().to_string(),
            source,
        })?;
    let ref_path = digest::parse_head(&head)?;

    let data = store
        .read_git_file(dir, &ref_path)
        .map_err(|source| BranchError::Unreadable {
            path: dir.git_path(&ref_path).display().to_string(),
            source,
        })?;
    let digest = Digest::from_ref_contents(&data);
    if digest.is_empty() {
        return Err(BranchError::Malformed(format!("{ref_path} is empty")));
    }

    Ok(BranchInfo {
        branch: digest::branch_name(&ref_path).to_string(),
        digest,
    })
}
