//! Tests for the per-plugin decision tree against a real sandboxed root and
//! a fake git.

#![allow(clippy::expect_used)]

use std::sync::Arc;

use packsync::application::services::executor::{DEFAULT_JOBS, Executor};
use packsync::application::services::reconcile::reconcile;
use packsync::application::services::scan::scan;
use packsync::domain::{Digest, Move, Outcome, PackDir, PluginState};
use packsync::infra::sandbox::PluginRoot;
use tokio_util::sync::CancellationToken;

use crate::helpers::{DIGEST_A, DIGEST_B, FakeGit, plugin_root, spec};

async fn discovered(root: &Arc<PluginRoot>, git: &Arc<FakeGit>, name: &str) -> Option<PluginState> {
    let executor = Executor::new(DEFAULT_JOBS, CancellationToken::new());
    scan(root, git, &executor).await.states.remove(name)
}

#[tokio::test]
async fn test_missing_state_installs_without_update_or_move() {
    let (tmp, root) = plugin_root();
    let git = FakeGit::new();

    let result = reconcile(&root, &git, None, &spec("a")).await;

    assert_eq!(result.plugin, "a");
    assert_eq!(result.outcome, Outcome::Installed);
    assert!(tmp.path().join("start/a").is_dir());
    assert!(git.pulls().is_empty());
    let clones = git.clones();
    assert_eq!(clones.len(), 1);
    assert_eq!(clones[0].0, "https://example.com/a.git");
    assert_eq!(clones[0].1, "main");
    assert_eq!(clones[0].2, root.path().join("start/a"));
}

#[tokio::test]
async fn test_optional_plugin_installs_under_opt() {
    let (tmp, root) = plugin_root();
    let git = FakeGit::new();
    let mut wanted = spec("lazy");
    wanted.opt = true;

    let result = reconcile(&root, &git, None, &wanted).await;

    assert_eq!(result.outcome, Outcome::Installed);
    assert!(tmp.path().join("opt/lazy/.git").is_dir());
    assert!(!tmp.path().join("start/lazy").exists());
}

#[tokio::test]
async fn test_branch_change_reinstalls_with_reason() {
    let (tmp, root) = plugin_root();
    let (root, git) = (Arc::new(root), Arc::new(FakeGit::new()));
    git.seed(tmp.path(), "start", "a", "https://example.com/a.git", "main", DIGEST_A);
    let state = discovered(&root, &git, "a").await;
    assert!(state.is_some());

    let mut wanted = spec("a");
    wanted.branch = "dev".to_string();
    let result = reconcile(root.as_ref(), git.as_ref(), state, &wanted).await;

    let Outcome::Reinstalled { reason } = &result.outcome else {
        panic!("expected reinstall, got {:?}", result.outcome);
    };
    assert!(reason.contains("main") && reason.contains("dev"), "{reason}");
    assert!(git.pulls().is_empty(), "reinstall must not pull");
    assert_eq!(git.clones()[0].1, "dev");
    let head = std::fs::read_to_string(tmp.path().join("start/a/.git/HEAD")).expect("HEAD");
    assert_eq!(head.trim(), "ref: refs/heads/dev");
}

#[tokio::test]
async fn test_url_change_reinstalls() {
    let (tmp, root) = plugin_root();
    let (root, git) = (Arc::new(root), Arc::new(FakeGit::new()));
    git.seed(tmp.path(), "start", "a", "https://old.example.com/a.git", "main", DIGEST_A);
    let state = discovered(&root, &git, "a").await;

    let result = reconcile(root.as_ref(), git.as_ref(), state, &spec("a")).await;

    assert_eq!(
        result.outcome,
        Outcome::Reinstalled {
            reason: "repo URL changed".to_string()
        }
    );
    assert!(git.pulls().is_empty());
}

#[tokio::test]
async fn test_opt_to_start_moves_before_pull() {
    let (tmp, root) = plugin_root();
    let (root, git) = (Arc::new(root), Arc::new(FakeGit::new()));
    git.seed(tmp.path(), "opt", "foo", "https://example.com/foo.git", "main", DIGEST_A);
    let state = discovered(&root, &git, "foo").await;

    let result = reconcile(root.as_ref(), git.as_ref(), state, &spec("foo")).await;

    assert_eq!(
        result.outcome,
        Outcome::Moved {
            moved: Move {
                from: PackDir::Opt,
                to: PackDir::Start
            }
        }
    );
    assert!(tmp.path().join("start/foo").is_dir());
    assert!(!tmp.path().join("opt/foo").exists());
    // The pull ran in the new location, so the move happened first.
    assert_eq!(git.pulls(), [root.path().join("start/foo")]);
}

#[tokio::test]
async fn test_move_and_update_combine() {
    let (tmp, root) = plugin_root();
    let git = FakeGit::new().advancing("foo");
    let (root, git) = (Arc::new(root), Arc::new(git));
    git.seed(tmp.path(), "start", "foo", "https://example.com/foo.git", "main", DIGEST_A);
    let state = discovered(&root, &git, "foo").await;

    let mut wanted = spec("foo");
    wanted.opt = true;
    let result = reconcile(root.as_ref(), git.as_ref(), state, &wanted).await;

    assert_eq!(
        result.outcome,
        Outcome::Updated {
            from: Digest::new(DIGEST_A.as_bytes()),
            to: Digest::new(DIGEST_B.as_bytes()),
            moved: Some(Move {
                from: PackDir::Start,
                to: PackDir::Opt
            }),
        }
    );
    assert!(tmp.path().join("opt/foo").is_dir());
}

#[tokio::test]
async fn test_pinned_never_pulls_even_after_move() {
    let (tmp, root) = plugin_root();
    let (root, git) = (Arc::new(root), Arc::new(FakeGit::new()));
    git.seed(tmp.path(), "opt", "pinned", "https://example.com/pinned.git", "main", DIGEST_A);
    let state = discovered(&root, &git, "pinned").await;

    let mut wanted = spec("pinned");
    wanted.pinned = true;
    let result = reconcile(root.as_ref(), git.as_ref(), state, &wanted).await;

    assert_eq!(
        result.outcome,
        Outcome::Pinned {
            moved: Some(Move {
                from: PackDir::Opt,
                to: PackDir::Start
            })
        }
    );
    assert!(tmp.path().join("start/pinned").is_dir());
    assert!(git.pulls().is_empty());
}

#[tokio::test]
async fn test_identical_digest_after_pull_is_unchanged() {
    let (tmp, root) = plugin_root();
    let (root, git) = (Arc::new(root), Arc::new(FakeGit::new()));
    git.seed(tmp.path(), "start", "a", "https://example.com/a.git", "main", DIGEST_A);
    let state = discovered(&root, &git, "a").await;

    let result = reconcile(root.as_ref(), git.as_ref(), state, &spec("a")).await;

    assert_eq!(result.outcome, Outcome::Unchanged);
    assert_eq!(git.pulls().len(), 1);
}

#[tokio::test]
async fn test_changed_digest_after_pull_is_updated() {
    let (tmp, root) = plugin_root();
    let (root, git) = (Arc::new(root), Arc::new(FakeGit::new().advancing("a")));
    git.seed(tmp.path(), "start", "a", "https://example.com/a.git", "main", DIGEST_A);
    let state = discovered(&root, &git, "a").await;

    let result = reconcile(root.as_ref(), git.as_ref(), state, &spec("a")).await;

    assert_eq!(
        result.outcome,
        Outcome::Updated {
            from: Digest::new(DIGEST_A.as_bytes()),
            to: Digest::new(DIGEST_B.as_bytes()),
            moved: None,
        }
    );
}

#[tokio::test]
async fn test_populated_destination_fails_without_cloning() {
    let (tmp, root) = plugin_root();
    let git = FakeGit::new();
    std::fs::create_dir_all(tmp.path().join("start/a")).expect("mkdir");
    std::fs::write(tmp.path().join("start/a/README.md"), "left over").expect("write");

    let result = reconcile(&root, &git, None, &spec("a")).await;

    let Outcome::Failed { cause } = &result.outcome else {
        panic!("expected failure, got {:?}", result.outcome);
    };
    assert!(cause.contains("already exists"), "{cause}");
    assert!(git.calls().is_empty(), "git must not be spawned");
    assert!(tmp.path().join("start/a/README.md").exists());
}

#[tokio::test]
async fn test_clone_failure_is_a_plugin_scoped_error() {
    let (_tmp, root) = plugin_root();
    let git = FakeGit::new().failing_clone("https://example.com/a.git");

    let result = reconcile(&root, &git, None, &spec("a")).await;

    let Outcome::Failed { cause } = &result.outcome else {
        panic!("expected failure, got {:?}", result.outcome);
    };
    assert!(cause.contains("git clone"), "{cause}");
    assert!(cause.contains("not found"), "{cause}");
}

#[tokio::test]
async fn test_pull_failure_is_a_plugin_scoped_error() {
    let (tmp, root) = plugin_root();
    let (root, git) = (Arc::new(root), Arc::new(FakeGit::new().failing_pull("a")));
    git.seed(tmp.path(), "start", "a", "https://example.com/a.git", "main", DIGEST_A);
    let state = discovered(&root, &git, "a").await;

    let result = reconcile(root.as_ref(), git.as_ref(), state, &spec("a")).await;

    assert!(result.outcome.is_failure());
}
