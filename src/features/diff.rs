// src/features/diff.rs
// File count, change impact and directory complexity from a commit diff

use crate::config::FeatureTables;
use crate::error::Result;
use crate::git::{self, FileChangeKind, PatchSet};
use git2::{Commit, Diff, Repository};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DiffFeatures {
    pub files_changed: usize,
    pub file_impact: u32,
    pub dir_complexity: f64,
}

/// Score an already parsed patch against the lookup tables
pub fn score_patch(patch: &PatchSet, tables: &FeatureTables) -> DiffFeatures {
    let impact = &tables.file_impact;
    let mut features = DiffFeatures {
        files_changed: patch.files.len(),
        ..DiffFeatures::default()
    };

    for file in &patch.files {
        let kind = file.kind();
        features.file_impact += match kind {
            FileChangeKind::Added => impact.new,
            FileChangeKind::Modified => impact.modified,
            FileChangeKind::Deleted => impact.deleted,
            FileChangeKind::Unknown => impact.unknown,
        };
        if kind != FileChangeKind::Unknown {
            features.dir_complexity += tables.dir_weight(file.top_level_dir());
        }
    }

    features
}

/// Diff features of a single-parent commit.
///
/// Root and merge commits fail with a precondition error, and so does a diff
/// that does not parse; neither is recovered here.
pub fn extract_diff_features(
    repo: &Repository,
    commit: &Commit<'_>,
    tables: &FeatureTables,
) -> Result<DiffFeatures> {
    score_diff(&git::parent_diff(repo, commit)?, tables)
}

/// Render, parse and score a diff that has already been computed
pub fn score_diff(diff: &Diff<'_>, tables: &FeatureTables) -> Result<DiffFeatures> {
    let patch = git::parse_unified_diff(&git::render_patch(diff)?)?;
    Ok(score_patch(&patch, tables))
}
