//! Tests for orphan removal: sandboxed deletes, and failures degrading to
//! warnings.

#![allow(clippy::expect_used)]

use std::io;
use std::path::{Path, PathBuf};

use mockall::mock;
use packsync::application::ports::PluginStore;
use packsync::application::services::orphans::remove_orphans;
use packsync::domain::{Digest, Outcome, PackDir, PluginDir, PluginState, SandboxError};

use crate::helpers::{DIGEST_A, plugin_root, write_checkout};

mock! {
    Store {}

    impl PluginStore for Store {
        fn ensure_pack_dirs(&self) -> Result<(), SandboxError>;
        fn list_repositories(&self, pack: PackDir) -> Result<Vec<String>, SandboxError>;
        fn read_git_file(&self, dir: &PluginDir, file: &str) -> io::Result<Vec<u8>>;
        fn resolve(&self, rel: &Path) -> Result<PathBuf, SandboxError>;
        fn is_populated(&self, rel: &Path) -> Result<bool, SandboxError>;
        fn create_dir_all(&self, rel: &Path) -> Result<(), SandboxError>;
        fn rename(&self, from: &Path, to: &Path) -> Result<(), SandboxError>;
        fn remove_dir_all(&self, rel: &Path) -> Result<(), SandboxError>;
    }
}

fn orphan(pack: PackDir, name: &str) -> PluginState {
    PluginState {
        name: name.to_string(),
        directory: PluginDir::new(pack, name),
        url: format!("https://example.com/{name}.git"),
        branch: "main".to_string(),
        digest: Digest::new(DIGEST_A.as_bytes()),
    }
}

#[test]
fn test_orphans_are_removed_from_disk() {
    let (tmp, root) = plugin_root();
    write_checkout(&tmp.path().join("start/foo"), "main", DIGEST_A);
    write_checkout(&tmp.path().join("opt/bar"), "main", DIGEST_A);

    let report = remove_orphans(
        &root,
        &[orphan(PackDir::Start, "foo"), orphan(PackDir::Opt, "bar")],
    );

    assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    assert_eq!(report.removed.len(), 2);
    assert!(report.removed.iter().all(|r| r.outcome == Outcome::Removed));
    assert!(!tmp.path().join("start/foo").exists());
    assert!(!tmp.path().join("opt/bar").exists());
    assert!(tmp.path().join("start").is_dir());
}

#[test]
fn test_failed_removal_becomes_warning_and_others_continue() {
    let mut store = MockStore::new();
    store
        .expect_remove_dir_all()
        .withf(|rel| rel == Path::new("start/stuck"))
        .times(1)
        .returning(|rel| {
            Err(SandboxError::Io {
                op: "remove",
                path: rel.to_path_buf(),
                source: io::Error::from(io::ErrorKind::PermissionDenied),
            })
        });
    store
        .expect_remove_dir_all()
        .withf(|rel| rel == Path::new("opt/gone"))
        .times(1)
        .returning(|_| Ok(()));

    let report = remove_orphans(
        &store,
        &[orphan(PackDir::Start, "stuck"), orphan(PackDir::Opt, "gone")],
    );

    assert_eq!(report.removed.len(), 1);
    assert_eq!(report.removed[0].plugin, "gone");
    assert_eq!(report.warnings.len(), 1);
    assert!(
        report.warnings[0].starts_with("cannot remove stuck (start/stuck)"),
        "{}",
        report.warnings[0]
    );
}

#[test]
fn test_containment_violation_is_a_warning_not_a_removal() {
    let mut store = MockStore::new();
    store
        .expect_remove_dir_all()
        .returning(|rel| Err(SandboxError::Escapes(rel.to_path_buf())));

    let report = remove_orphans(&store, &[orphan(PackDir::Start, "link")]);

    assert!(report.removed.is_empty());
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("outside the plugin root"), "{}", report.warnings[0]);
}

#[test]
fn test_no_orphans_touches_nothing() {
    let mut store = MockStore::new();
    store.expect_remove_dir_all().never();
    let report = remove_orphans(&store, &[]);
    assert!(report.removed.is_empty());
    assert!(report.warnings.is_empty());
}
