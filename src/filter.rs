// src/filter.rs
// Informative-commit filter

use crate::error::Result;
use crate::git::{self, PatchSet, short_hash};
use git2::{Commit, Diff, Repository};
use tracing::{debug, warn};

/// How hard the filter looks at a commit's diff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    /// Single parent and non-zero line stats
    Lenient,
    /// Additionally parse the patch and require a minimum of changed hunk lines
    Strict { min_changed_lines: usize },
}

/// Outcome of screening one commit
pub enum Screening<'repo> {
    Skip,
    /// Informative. `patch` is already parsed when strict mode had to look at it.
    Keep {
        diff: Diff<'repo>,
        patch: Option<PatchSet>,
    },
}

impl Screening<'_> {
    pub fn is_keep(&self) -> bool {
        matches!(self, Screening::Keep { .. })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CommitFilter {
    mode: FilterMode,
}

impl CommitFilter {
    pub fn new(mode: FilterMode) -> Self {
        Self { mode }
    }

    /// Whether a commit is worth extracting features from.
    ///
    /// Backend errors propagate. Under strict mode a patch that fails to parse
    /// is logged and treated as uninformative.
    pub fn is_informative(&self, repo: &Repository, commit: &Commit<'_>) -> Result<bool> {
        Ok(self.screen(repo, commit)?.is_keep())
    }

    /// Screen a commit, keeping the diff (and parsed patch, if any) for extraction
    pub fn screen<'repo>(&self, repo: &'repo Repository, commit: &Commit<'_>) -> Result<Screening<'repo>> {
        let hash = short_hash(&commit.id(), 12);

        if commit.parent_count() != 1 {
            debug!(hash = %hash, parents = commit.parent_count(), "Skipping non-simple commit");
            return Ok(Screening::Skip);
        }

        let diff = git::parent_diff(repo, commit)?;
        if git::changed_lines(&diff)? == 0 {
            debug!(hash = %hash, "Skipping commit without changed lines");
            return Ok(Screening::Skip);
        }

        if let FilterMode::Lenient = self.mode {
            return Ok(Screening::Keep { diff, patch: None });
        }

        let text = git::render_patch(&diff)?;
        Ok(match self.judge_patch(&hash, &text) {
            Some(patch) => Screening::Keep {
                diff,
                patch: Some(patch),
            },
            None => Screening::Skip,
        })
    }

    /// Strict-mode verdict on rendered patch text. Returns the parsed patch when it passes.
    pub fn judge_patch(&self, hash: &str, text: &str) -> Option<PatchSet> {
        let patch = match git::parse_unified_diff(text) {
            Ok(patch) => patch,
            Err(e) => {
                warn!(hash = %hash, error = %e, "Could not parse diff, treating commit as uninformative");
                return None;
            }
        };

        if let FilterMode::Strict { min_changed_lines } = self.mode {
            let changed = patch.changed_lines();
            if changed < min_changed_lines {
                debug!(hash = %hash, changed, "Skipping commit below changed-line threshold");
                return None;
            }
        }

        Some(patch)
    }
}

impl Default for CommitFilter {
    fn default() -> Self {
        Self::new(FilterMode::Lenient)
    }
}
