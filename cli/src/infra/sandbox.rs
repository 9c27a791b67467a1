//! Infrastructure implementation of the `PluginStore` port.
//!
//! `PluginRoot` owns a canonical root path and a capability handle on it.
//! Every argument is normalized lexically, then resolved through the real
//! filesystem (following symlinks on the deepest existing ancestor) and
//! checked to be a strict descendant of the root. Only then does the call
//! reach `cap_std`, whose `Dir` refuses to leave the root on its own.

use std::io;
use std::path::{Component, Path, PathBuf};

use cap_std::ambient_authority;
use cap_std::fs::Dir;

use crate::application::ports::PluginStore;
use crate::domain::{PackDir, PluginDir, SandboxError};

/// Name of the metadata entry that marks a working tree.
const GIT_DIR: &str = ".git";

/// Sandboxed handle on the directory holding `start/` and `opt/`.
#[derive(Debug)]
pub struct PluginRoot {
    path: PathBuf,
    dir: Dir,
}

impl PluginRoot {
    /// Create `path` (and parents) if needed, then open it.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or opened.
    pub fn create(path: &Path) -> Result<Self, SandboxError> {
        std::fs::create_dir_all(path).map_err(io_err("create", path))?;
        Self::open(path)
    }

    /// Open an existing root.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` does not exist or is not a directory.
    pub fn open(path: &Path) -> Result<Self, SandboxError> {
        let path = std::fs::canonicalize(path).map_err(io_err("open", path))?;
        let dir = Dir::open_ambient_dir(&path, ambient_authority()).map_err(io_err("open", &path))?;
        Ok(Self { path, dir })
    }

    /// The canonical root path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Normalize `rel` and prove it stays under the root.
    ///
    /// Returns the normalized relative path to hand to `cap_std`.
    fn contain(&self, rel: &Path) -> Result<PathBuf, SandboxError> {
        let norm = normalize(rel)?;
        let resolved = self.resolve_normalized(&norm)?;
        tracing::trace!(path = %resolved.display(), "contained");
        Ok(norm)
    }

    fn resolve_normalized(&self, norm: &Path) -> Result<PathBuf, SandboxError> {
        let full = self.path.join(norm);
        let mut existing = full.as_path();
        let mut missing = Vec::new();
        let canonical = loop {
            match std::fs::canonicalize(existing) {
                Ok(canonical) => break canonical,
                Err(err) if err.kind() == io::ErrorKind::NotFound => {
                    let (Some(name), Some(parent)) = (existing.file_name(), existing.parent())
                    else {
                        return Err(SandboxError::Escapes(norm.to_path_buf()));
                    };
                    missing.push(name);
                    existing = parent;
                }
                Err(err) => return Err(io_err("resolve", existing)(err)),
            }
        };

        let mut resolved = canonical;
        for name in missing.into_iter().rev() {
            resolved.push(name);
        }
        if resolved == self.path || !resolved.starts_with(&self.path) {
            return Err(SandboxError::Escapes(norm.to_path_buf()));
        }
        Ok(resolved)
    }

    fn is_repository(&self, rel: &Path) -> bool {
        self.dir
            .metadata(rel.join(GIT_DIR))
            .is_ok_and(|meta| meta.is_dir() || meta.is_file())
    }
}

impl PluginStore for PluginRoot {
    fn ensure_pack_dirs(&self) -> Result<(), SandboxError> {
        for pack in PackDir::ALL {
            self.dir
                .create_dir_all(pack.as_str())
                .map_err(io_err("create", &self.path.join(pack.as_str())))?;
        }
        Ok(())
    }

    fn list_repositories(&self, pack: PackDir) -> Result<Vec<String>, SandboxError> {
        let rel = Path::new(pack.as_str());
        let entries = match self.dir.read_dir(rel) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(io_err("list", rel)(err)),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(io_err("list", rel))?;
            let is_dir = entry.file_type().map_err(io_err("list", rel))?.is_dir();
            if !is_dir {
                continue;
            }
            let Ok(name) = entry.file_name().into_string() else {
                tracing::debug!(pack = %pack, "ignoring non UTF-8 entry");
                continue;
            };
            if self.is_repository(&rel.join(&name)) {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    fn read_git_file(&self, dir: &PluginDir, file: &str) -> io::Result<Vec<u8>> {
        let git_dir = dir.path().join(GIT_DIR);
        let rel = normalize(&git_dir.join(file))
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        if !rel.starts_with(&git_dir) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{file} points outside {}", git_dir.display()),
            ));
        }
        self.dir.read(rel)
    }

    fn resolve(&self, rel: &Path) -> Result<PathBuf, SandboxError> {
        let norm = normalize(rel)?;
        self.resolve_normalized(&norm)
    }

    fn is_populated(&self, rel: &Path) -> Result<bool, SandboxError> {
        let norm = self.contain(rel)?;
        let meta = match self.dir.symlink_metadata(&norm) {
            Ok(meta) => meta,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(err) => return Err(io_err("stat", &norm)(err)),
        };
        if !meta.is_dir() {
            return Ok(true);
        }
        let mut entries = self.dir.read_dir(&norm).map_err(io_err("list", &norm))?;
        Ok(entries.next().is_some())
    }

    fn create_dir_all(&self, rel: &Path) -> Result<(), SandboxError> {
        let norm = self.contain(rel)?;
        self.dir
            .create_dir_all(&norm)
            .map_err(io_err("create", &norm))
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<(), SandboxError> {
        let from = self.contain(from)?;
        let to = self.contain(to)?;
        self.dir
            .rename(&from, &self.dir, &to)
            .map_err(io_err("rename", &from))
    }

    fn remove_dir_all(&self, rel: &Path) -> Result<(), SandboxError> {
        let norm = self.contain(rel)?;
        self.dir
            .remove_dir_all(&norm)
            .map_err(io_err("remove", &norm))
    }
}

/// Lexically normalize a root-relative path.
///
/// Rejects absolute paths, anything whose `..` climbs above the root, and
/// the root itself.
///
/// # Errors
///
/// Returns [`SandboxError::Absolute`] or [`SandboxError::Escapes`].
pub fn normalize(rel: &Path) -> Result<PathBuf, SandboxError> {
    let mut out = PathBuf::new();
    for component in rel.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => {
                return Err(SandboxError::Absolute(rel.to_path_buf()));
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    return Err(SandboxError::Escapes(rel.to_path_buf()));
                }
            }
            Component::Normal(part) => out.push(part),
        }
    }
    if out.as_os_str().is_empty() {
        return Err(SandboxError::Escapes(rel.to_path_buf()));
    }
    Ok(out)
}

fn io_err(op: &'static str, path: &Path) -> impl FnOnce(io::Error) -> SandboxError {
    let path = path.to_path_buf();
    move |source| SandboxError::Io { op, path, source }
}
