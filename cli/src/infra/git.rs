//! Infrastructure implementation of the `VcsClient` port.
//!
//! `GitCli<R>` routes every git invocation through a `CommandRunner`, so
//! tests can inject a recording runner without spawning processes.

use std::path::Path;
use std::process::Output;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};

use crate::application::ports::{CommandRunner, VcsClient};
use crate::domain::digest::{self, BranchInfo};
use crate::domain::BranchError;

/// Partial clone of a branch.
pub const CLONE_TIMEOUT: Duration = Duration::from_secs(120);
/// Fetch-and-merge with submodules.
pub const PULL_TIMEOUT: Duration = Duration::from_secs(60);
/// `ls-remote --get-url` reads local config only.
pub const REMOTE_URL_TIMEOUT: Duration = Duration::from_secs(1);
/// Fallback branch/commit query.
pub const HEAD_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

const GIT: &str = "git";

/// Adapter that shells out to the `git` binary.
pub struct GitCli<R: CommandRunner> {
    runner: R,
}

impl<R: CommandRunner> GitCli<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    async fn git(&self, args: &[&str], timeout: Duration) -> Result<Output> {
        let output = self.runner.run_with_timeout(GIT, args, timeout).await?;
        if !output.status.success() {
            bail!("{}", failure_detail(&output));
        }
        Ok(output)
    }
}

impl<R: CommandRunner> VcsClient for GitCli<R> {
    async fn clone_branch(&self, url: &str, branch: &str, dest: &Path) -> Result<()> {
        let dest = utf8(dest)?;
        self.git(
            &["clone", "--filter=blob:none", "-b", branch, url, dest],
            CLONE_TIMEOUT,
        )
        .await
        .context("git clone")?;
        Ok(())
    }

    async fn pull(&self, dir: &Path) -> Result<()> {
        let dir = utf8(dir)?;
        self.git(&["-C", dir, "pull", "--recurse-submodules"], PULL_TIMEOUT)
            .await
            .context("git pull")?;
        Ok(())
    }

    async fn remote_url(&self, dir: &Path) -> Result<String> {
        let dir = utf8(dir)?;
        let output = self
            .git(&["-C", dir, "ls-remote", "--get-url"], REMOTE_URL_TIMEOUT)
            .await
            .context("git ls-remote --get-url")?;
        let url = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if url.is_empty() {
            bail!("git ls-remote --get-url printed nothing");
        }
        Ok(url)
    }

    async fn head_info(&self, dir: &Path) -> std::result::Result<BranchInfo, BranchError> {
        let dir = utf8(dir).map_err(|e| BranchError::Query(e.to_string()))?;
        let output = self
            .git(
                &["-C", dir, "rev-parse", "--abbrev-ref", "HEAD", "HEAD"],
                HEAD_QUERY_TIMEOUT,
            )
            .await
            .map_err(|e| BranchError::Query(format!("{e:#}")))?;
        digest::parse_rev_parse(&output.stdout)
    }
}

fn utf8(path: &Path) -> Result<&str> {
    path.to_str()
        .ok_or_else(|| anyhow!("path is not valid UTF-8: {}", path.display()))
}

/// Exit status plus the last non-empty stderr line, which is where git puts
/// the reason.
fn failure_detail(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    match stderr.lines().rev().map(str::trim).find(|l| !l.is_empty()) {
        Some(line) => format!("{}: {line}", output.status),
        None => output.status.to_string(),
    }
}
