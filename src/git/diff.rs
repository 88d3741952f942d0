// src/git/diff.rs
// Commit-to-parent diffs using git2

use crate::error::{FixtrailError, Result};
use crate::git::short_hash;
use git2::{Commit, Diff, DiffFindOptions, DiffFormat, Repository};

/// Diff between a commit and its single parent, with rename detection.
///
/// Fails with [`FixtrailError::Precondition`] for root and merge commits.
pub fn parent_diff<'repo>(repo: &'repo Repository, commit: &Commit<'_>) -> Result<Diff<'repo>> {
    if commit.parent_count() != 1 {
        return Err(FixtrailError::Precondition {
            hash: short_hash(&commit.id(), 40),
            parents: commit.parent_count(),
        });
    }

    let parent_tree = commit.parent(0)?.tree()?;
    let commit_tree = commit.tree()?;

    let mut diff = repo.diff_tree_to_tree(Some(&parent_tree), Some(&commit_tree), None)?;
    let mut find = DiffFindOptions::new();
    find.renames(true);
    diff.find_similar(Some(&mut find))?;

    Ok(diff)
}

/// Aggregate added + removed lines, as `git diff --shortstat` reports them
pub fn changed_lines(diff: &Diff<'_>) -> Result<usize> {
    let stats = diff.stats()?;
    Ok(stats.insertions() + stats.deletions())
}

/// Render a diff as unified patch text
pub fn render_patch(diff: &Diff<'_>) -> Result<String> {
    let mut text = String::new();

    diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
        // File and hunk headers carry their own text; body lines need the origin marker
        if matches!(line.origin(), '+' | '-' | ' ') {
            text.push(line.origin());
        }
        text.push_str(&String::from_utf8_lossy(line.content()));
        true
    })?;

    Ok(text)
}
