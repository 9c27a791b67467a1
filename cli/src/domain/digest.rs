//! Commit digests and the pure parsing half of branch discovery.
//!
//! Reading `.git/HEAD` and the ref it points at happens elsewhere; this module
//! only turns the bytes of those files (or the output of the fallback git
//! query) into a [`BranchInfo`].

use std::fmt;

use serde::{Serialize, Serializer};

use crate::domain::error::BranchError;

/// Prefix that marks a symbolic ref in `.git/HEAD`.
pub const REF_PREFIX: &[u8] = b"ref: ";

/// Namespace of local branches inside `.git`.
pub const HEADS_PREFIX: &str = "refs/heads/";

/// Number of bytes shown when a digest is displayed to a person.
pub const SHORT_LEN: usize = 7;

/// What the fallback query prints in place of a branch name when HEAD is detached.
pub const DETACHED_MARKER: &str = "HEAD";

/// Opaque commit identifier. Equality is exact byte comparison.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Digest(Vec<u8>);

impl Digest {
    #[must_use]
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Build a digest from the raw contents of a ref file, dropping one
    /// trailing line ending.
    #[must_use]
    pub fn from_ref_contents(data: &[u8]) -> Self {
        Self(trim_line_end(data).to_vec())
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Display prefix, at most [`SHORT_LEN`] bytes.
    #[must_use]
    pub fn short(&self) -> String {
        let end = self.0.len().min(SHORT_LEN);
        String::from_utf8_lossy(&self.0[..end]).into_owned()
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({:?})", String::from_utf8_lossy(&self.0))
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Branch name and HEAD digest of one working tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchInfo {
    pub branch: String,
    pub digest: Digest,
}

/// Strip a single trailing `\r\n` or `\n`.
#[must_use]
pub fn trim_line_end(data: &[u8]) -> &[u8] {
    data.strip_suffix(b"\r\n")
        .or_else(|| data.strip_suffix(b"\n"))
        .unwrap_or(data)
}

/// Parse the contents of `.git/HEAD` into a ref path such as `refs/heads/main`.
///
/// # Errors
///
/// Returns [`BranchError::Detached`] when HEAD does not carry the `ref: `
/// prefix and [`BranchError::Malformed`] when the ref path is empty or not
/// UTF-8.
pub fn parse_head(data: &[u8]) -> Result<String, BranchError> {
    let Some(rest) = data.strip_prefix(REF_PREFIX) else {
        return Err(BranchError::Detached);
    };
    let ref_path = std::str::from_utf8(trim_line_end(rest))
        .map_err(|_| BranchError::Malformed("HEAD ref is not valid UTF-8".to_string()))?;
    if ref_path.is_empty() {
        return Err(BranchError::Malformed("HEAD names an empty ref".to_string()));
    }
    Ok(ref_path.to_string())
}

/// Branch name for a ref path: `refs/heads/feature/x` becomes `feature/x`.
#[must_use]
pub fn branch_name(ref_path: &str) -> &str {
    ref_path.strip_prefix(HEADS_PREFIX).unwrap_or(ref_path)
}

/// Parse the output of `git rev-parse --abbrev-ref HEAD HEAD`.
///
/// # Errors
///
/// Returns [`BranchError::Detached`] when the branch line is the detached
/// marker and [`BranchError::Malformed`] unless there are exactly two lines.
pub fn parse_rev_parse(stdout: &[u8]) -> Result<BranchInfo, BranchError> {
    let text = String::from_utf8_lossy(stdout);
    let lines: Vec<&str> = text.trim().lines().map(str::trim).collect();
    let [branch, digest] = lines.as_slice() else {
        return Err(BranchError::Malformed(format!(
            "expected branch and commit lines, got {} line(s)",
            lines.len()
        )));
    };
    if *branch == DETACHED_MARKER {
        return Err(BranchError::Detached);
    }
    Ok(BranchInfo {
        branch: (*branch).to_string(),
        digest: Digest::new(digest.as_bytes()),
    })
}
