//! Tests for discovering on-disk plugin state.

#![allow(clippy::expect_used)]

use std::sync::Arc;

use packsync::application::services::executor::{DEFAULT_JOBS, Executor};
use packsync::application::services::scan::scan;
use packsync::domain::{Digest, PackDir};
use tokio_util::sync::CancellationToken;

use crate::helpers::{DIGEST_A, DIGEST_B, FakeGit, plugin_root};

fn executor() -> Executor {
    Executor::new(DEFAULT_JOBS, CancellationToken::new())
}

#[tokio::test]
async fn test_scan_builds_one_state_per_working_tree() {
    let (tmp, root) = plugin_root();
    let git = FakeGit::new();
    git.seed(tmp.path(), "start", "a", "https://example.com/a.git", "main", DIGEST_A);
    git.seed(tmp.path(), "opt", "b", "https://example.com/b.git", "dev", DIGEST_B);
    std::fs::create_dir_all(tmp.path().join("start/not-a-repo")).expect("mkdir");

    let report = scan(&Arc::new(root), &Arc::new(git), &executor()).await;

    assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    assert_eq!(report.states.len(), 2);
    let a = &report.states["a"];
    assert_eq!(a.directory.pack, PackDir::Start);
    assert_eq!(a.url, "https://example.com/a.git");
    assert_eq!(a.branch, "main");
    assert_eq!(a.digest, Digest::new(DIGEST_A.as_bytes()));
    let b = &report.states["b"];
    assert_eq!(b.directory.pack, PackDir::Opt);
    assert_eq!(b.branch, "dev");
}

#[tokio::test]
async fn test_unreadable_tree_is_dropped_with_warning() {
    let (tmp, root) = plugin_root();
    let git = FakeGit::new();
    git.seed(tmp.path(), "start", "good", "https://example.com/good.git", "main", DIGEST_A);
    // Metadata present but no remote configured.
    crate::helpers::write_checkout(&tmp.path().join("start/orphaned-remote"), "main", DIGEST_A);

    let report = scan(&Arc::new(root), &Arc::new(git), &executor()).await;

    assert_eq!(report.states.len(), 1);
    assert!(report.states.contains_key("good"));
    assert_eq!(report.warnings.len(), 1);
    assert!(
        report.warnings[0].contains("start/orphaned-remote")
            && report.warnings[0].contains("repo URL"),
        "{}",
        report.warnings[0]
    );
}

#[tokio::test]
async fn test_detached_tree_is_dropped_with_warning() {
    let (tmp, root) = plugin_root();
    let git = FakeGit::new();
    let git_dir = tmp.path().join("start/detached/.git");
    std::fs::create_dir_all(&git_dir).expect("mkdir");
    std::fs::write(git_dir.join("HEAD"), format!("{DIGEST_A}\n")).expect("HEAD");
    git.set_remote("detached", "https://example.com/detached.git");

    let report = scan(&Arc::new(root), &Arc::new(git), &executor()).await;

    assert!(report.states.is_empty());
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("detached"), "{}", report.warnings[0]);
}

#[tokio::test]
async fn test_same_name_in_both_packs_keeps_start() {
    let (tmp, root) = plugin_root();
    let git = FakeGit::new();
    git.seed(tmp.path(), "start", "dup", "https://example.com/dup.git", "main", DIGEST_A);
    crate::helpers::write_checkout(&tmp.path().join("opt/dup"), "main", DIGEST_B);

    let report = scan(&Arc::new(root), &Arc::new(git), &executor()).await;

    assert_eq!(report.states.len(), 1);
    assert_eq!(report.states["dup"].directory.pack, PackDir::Start);
    assert_eq!(report.states["dup"].digest, Digest::new(DIGEST_A.as_bytes()));
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("opt/dup"), "{}", report.warnings[0]);
}

#[tokio::test]
async fn test_empty_root_yields_empty_state() {
    let (_tmp, root) = plugin_root();
    let report = scan(&Arc::new(root), &Arc::new(FakeGit::new()), &executor()).await;
    assert!(report.states.is_empty());
    assert!(report.warnings.is_empty());
}
