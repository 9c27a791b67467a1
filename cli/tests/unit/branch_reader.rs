//! Tests for reading branch and digest from working-tree metadata.

#![allow(clippy::expect_used)]

use packsync::application::services::branch::{branch_info, read_from_files};
use packsync::domain::{BranchError, BranchInfo, Digest, PackDir, PluginDir};

use crate::helpers::{DIGEST_A, DIGEST_B, FakeGit, GitCall, plugin_root, write_checkout};

#[tokio::test]
async fn test_reads_branch_and_digest_from_files_without_git() {
    let (tmp, root) = plugin_root();
    write_checkout(&tmp.path().join("start/foo"), "someBranch", DIGEST_A);
    let git = FakeGit::new();

    let info = branch_info(&root, &git, &PluginDir::new(PackDir::Start, "foo"))
        .await
        .expect("readable");

    assert_eq!(info.branch, "someBranch");
    assert_eq!(info.digest, Digest::new(DIGEST_A.as_bytes()));
    assert!(git.calls().is_empty(), "no subprocess expected");
}

#[test]
fn test_crlf_line_endings_are_trimmed() {
    let (tmp, root) = plugin_root();
    let git_dir = tmp.path().join("opt/bar/.git");
    std::fs::create_dir_all(git_dir.join("refs/heads")).expect("mkdir");
    std::fs::write(git_dir.join("HEAD"), "ref: refs/heads/main\r\n").expect("HEAD");
    std::fs::write(git_dir.join("refs/heads/main"), format!("{DIGEST_B}\r\n")).expect("ref");

    let info = read_from_files(&root, &PluginDir::new(PackDir::Opt, "bar")).expect("readable");
    assert_eq!(info.branch, "main");
    assert_eq!(info.digest.as_bytes(), DIGEST_B.as_bytes());
}

#[tokio::test]
async fn test_detached_head_is_reported_without_fallback() {
    let (tmp, root) = plugin_root();
    let git_dir = tmp.path().join("start/foo/.git");
    std::fs::create_dir_all(&git_dir).expect("mkdir");
    std::fs::write(git_dir.join("HEAD"), format!("{DIGEST_A}\n")).expect("HEAD");
    let git = FakeGit::new();

    let err = branch_info(&root, &git, &PluginDir::new(PackDir::Start, "foo"))
        .await
        .expect_err("detached");

    assert!(matches!(err, BranchError::Detached), "{err}");
    assert!(git.calls().is_empty(), "detached must not ask git");
}

#[tokio::test]
async fn test_packed_refs_fall_back_to_git() {
    let (tmp, root) = plugin_root();
    let git_dir = tmp.path().join("start/packed/.git");
    std::fs::create_dir_all(&git_dir).expect("mkdir");
    std::fs::write(git_dir.join("HEAD"), "ref: refs/heads/main\n").expect("HEAD");
    std::fs::write(git_dir.join("packed-refs"), format!("{DIGEST_A} refs/heads/main\n"))
        .expect("packed-refs");

    let git = FakeGit::new();
    let expected = BranchInfo {
        branch: "main".to_string(),
        digest: Digest::new(DIGEST_A.as_bytes()),
    };
    git.answer_head("packed", expected.clone());

    let info = branch_info(&root, &git, &PluginDir::new(PackDir::Start, "packed"))
        .await
        .expect("fallback answers");

    assert_eq!(info, expected);
    assert_eq!(
        git.calls(),
        [GitCall::HeadInfo(root.path().join("start/packed"))]
    );
}

#[tokio::test]
async fn test_fallback_error_is_returned_when_git_also_fails() {
    let (tmp, root) = plugin_root();
    std::fs::create_dir_all(tmp.path().join("start/broken/.git")).expect("mkdir");
    let git = FakeGit::new();

    let err = branch_info(&root, &git, &PluginDir::new(PackDir::Start, "broken"))
        .await
        .expect_err("nothing readable");
    assert!(matches!(err, BranchError::Query(_)), "{err}");
}

#[test]
fn test_empty_ref_file_is_malformed() {
    let (tmp, root) = plugin_root();
    write_checkout(&tmp.path().join("start/foo"), "main", "");
    let err = read_from_files(&root, &PluginDir::new(PackDir::Start, "foo")).expect_err("empty");
    assert!(matches!(err, BranchError::Malformed(_)), "{err}");
}
