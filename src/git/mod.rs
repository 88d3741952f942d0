// src/git/mod.rs
// Centralized git operations
//
// - range: revision range expressions
// - walk: lazy commit traversal
// - diff: git2 commit-to-parent diffs and patch rendering
// - patch: unified diff parsing

pub mod diff;
pub mod patch;
pub mod range;
pub mod walk;

pub use diff::{changed_lines, parent_diff, render_patch};
pub use patch::{FileChangeKind, PatchSet, PatchedFile, parse_unified_diff};
pub use range::RevisionRange;
pub use walk::{CommitWalk, resolve};

use crate::error::Result;
use git2::{Oid, Repository};
use std::path::Path;
use tracing::debug;

/// Open the repository at exactly `path` (no upward discovery)
pub fn open_repository(path: &Path) -> Result<Repository> {
    let repo = Repository::open(path)?;
    debug!(path = %path.display(), "Opened repository");
    Ok(repo)
}

/// Truncate an object id to its first `len` hex characters
pub fn short_hash(oid: &Oid, len: usize) -> String {
    let full = oid.to_string();
    full[..len.min(full.len())].to_string()
}

/// Number of commits in a range, merges included (`git rev-list --count`)
pub fn count_commits(repo: &Repository, range: &RevisionRange) -> Result<usize> {
    let mut count = 0;
    for commit in CommitWalk::new(repo, range, true)? {
        commit?;
        count += 1;
    }
    Ok(count)
}
