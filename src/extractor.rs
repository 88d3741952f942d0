// src/extractor.rs
// Feature extraction engine: ties the commit source, filter, extractors and labelers together

use crate::config::{FeatureTables, FixtrailConfig};
use crate::error::{FixtrailError, Result};
use crate::features::{
    self, CommitMetadata, DiffFeatures, FeatureRecord, MessageAnalyzer, TrailerCounts,
    stripped_message,
};
use crate::filter::{CommitFilter, FilterMode, Screening};
use crate::git::{self, CommitWalk, RevisionRange};
use crate::labels::{
    self, FixedHashIndex, FixesScanner, HeuristicLabeler, ToolIndex, ToolMatcher, ToolPolicy,
};
use git2::{Commit, Oid, Repository};
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};

/// What the assembler attaches to every record besides the base features.
///
/// With `fixed` set the label comes from the cross-reference index, otherwise
/// from the message heuristics.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureOptions<'a> {
    pub fixed: Option<&'a FixedHashIndex>,
    pub tools: Option<&'a ToolIndex>,
    pub with_message: bool,
}

/// Number of commits between two consecutive release tags
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatchVolume {
    pub version: String,
    pub patches: usize,
}

/// Commit feature extractor bound to one repository.
///
/// Lookup tables are taken from the config at construction and never change
/// afterwards. Index-building passes return frozen values that are handed back
/// in through [`FeatureOptions`].
pub struct FeatureExtractor {
    repo: Repository,
    tables: FeatureTables,
    key_len: usize,
    filter: CommitFilter,
    analyzer: MessageAnalyzer,
    heuristic: HeuristicLabeler,
    scanner: FixesScanner,
    tools: ToolMatcher,
}

impl FeatureExtractor {
    /// Open the repository at `path`
    pub fn open(path: &Path, config: &FixtrailConfig) -> Result<Self> {
        Self::from_repository(git::open_repository(path)?, config)
    }

    pub fn from_repository(repo: Repository, config: &FixtrailConfig) -> Result<Self> {
        let tables = config.tables.clone();
        let key_len = config.extract.hash_key_len;

        let mode = if config.extract.strict {
            FilterMode::Strict {
                min_changed_lines: config.extract.min_changed_lines,
            }
        } else {
            FilterMode::Lenient
        };

        Ok(Self {
            filter: CommitFilter::new(mode),
            analyzer: MessageAnalyzer::new(&tables),
            heuristic: HeuristicLabeler::new(&tables.heuristic_patterns)?,
            scanner: FixesScanner::new(&tables.fixes_pattern, key_len)?,
            tools: ToolMatcher::new(&tables.tools)?,
            repo,
            tables,
            key_len,
        })
    }

    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    pub fn key_len(&self) -> usize {
        self.key_len
    }

    /// Join key of a commit
    pub fn key(&self, commit: &Commit<'_>) -> String {
        git::short_hash(&commit.id(), self.key_len)
    }

    /// Non-merge commits of a range, newest first. Every call starts a fresh walk.
    pub fn get_commits(&self, range: &RevisionRange) -> Result<CommitWalk<'_>> {
        CommitWalk::new(&self.repo, range, false)
    }

    /// All commits of a range, merges included
    pub fn get_all_commits(&self, range: &RevisionRange) -> Result<CommitWalk<'_>> {
        CommitWalk::new(&self.repo, range, true)
    }

    pub fn is_informative(&self, commit: &Commit<'_>) -> Result<bool> {
        self.filter.is_informative(&self.repo, commit)
    }

    pub fn extract_commit_metadata(&self, commit: &Commit<'_>) -> CommitMetadata {
        features::extract_commit_metadata(commit, self.key_len)
    }

    pub fn analyze_commit_message(&self, message: &str) -> TrailerCounts {
        self.analyzer.analyze(message)
    }

    /// Diff features of a single-parent commit; anything else is a precondition error
    pub fn extract_diff_features(&self, commit: &Commit<'_>) -> Result<DiffFeatures> {
        features::extract_diff_features(&self.repo, commit, &self.tables)
    }

    /// Heuristic label from the commit message alone
    pub fn label_commit(&self, commit: &Commit<'_>) -> u8 {
        self.heuristic.label(&stripped_message(commit))
    }

    /// Keys of every commit some commit in the range claims to fix
    pub fn find_fixed_commits(&self, range: &RevisionRange) -> Result<FixedHashIndex> {
        FixedHashIndex::build(&self.repo, range, &self.scanner)
    }

    pub fn find_fixed_commits_with_tool_indication(
        &self,
        range: &RevisionRange,
        policy: ToolPolicy,
    ) -> Result<ToolIndex> {
        ToolIndex::build(&self.repo, range, &self.scanner, &self.tools, policy)
    }

    pub fn extract_bug_lifetimes(&self, range: &RevisionRange) -> Result<Vec<i64>> {
        labels::extract_bug_lifetimes(&self.repo, range, &self.scanner)
    }

    /// Assemble one record. The caller is responsible for filtering first.
    pub fn get_full_feature_vector(
        &self,
        commit: &Commit<'_>,
        options: &FeatureOptions<'_>,
    ) -> Result<FeatureRecord> {
        let diff = self.extract_diff_features(commit)?;
        Ok(self.assemble(commit, diff, options))
    }

    /// Record for a commit the filter kept, reusing its diff and any parsed patch
    fn screened_feature_vector(
        &self,
        commit: &Commit<'_>,
        screening: Screening<'_>,
        options: &FeatureOptions<'_>,
    ) -> Option<Result<FeatureRecord>> {
        let Screening::Keep { diff, patch } = screening else {
            return None;
        };
        let scored = match patch {
            Some(patch) => Ok(features::score_patch(&patch, &self.tables)),
            None => features::score_diff(&diff, &self.tables),
        };
        Some(scored.map(|features| self.assemble(commit, features, options)))
    }

    fn assemble(&self, commit: &Commit<'_>, diff: DiffFeatures, options: &FeatureOptions<'_>) -> FeatureRecord {
        let metadata = self.extract_commit_metadata(commit);
        let message = stripped_message(commit);
        let trailers = self.analyze_commit_message(&message);

        let label = match options.fixed {
            Some(index) => index.label(&metadata.commit_hash),
            None => self.heuristic.label(&message),
        };
        let tool_found = options.tools.map(|tools| tools.tool_found(&metadata.commit_hash));

        FeatureRecord {
            metadata,
            trailers,
            diff,
            label,
            tool_found,
            message: options.with_message.then_some(message),
        }
    }

    /// Lazy stream of records for every informative commit in the range
    pub fn features<'a>(
        &'a self,
        range: &RevisionRange,
        options: FeatureOptions<'a>,
    ) -> Result<FeatureStream<'a>> {
        Ok(FeatureStream {
            extractor: self,
            walk: self.get_commits(range)?,
            options,
            seen: HashMap::new(),
            visited: 0,
            emitted: 0,
            finished: false,
        })
    }

    /// Commits in a range, merges included, like `git rev-list --count`
    pub fn count_patches(&self, range: &RevisionRange) -> Result<usize> {
        git::count_commits(&self.repo, range)
    }

    /// Commit counts between consecutive tags, labelled by the later tag
    pub fn patch_volume<S: AsRef<str>>(&self, tags: &[S]) -> Result<Vec<PatchVolume>> {
        if tags.len() < 2 {
            return Err(FixtrailError::InvalidInput(
                "patch volume needs at least two tags".to_string(),
            ));
        }

        let mut volumes = Vec::with_capacity(tags.len() - 1);
        for pair in tags.windows(2) {
            let (from, to) = (pair[0].as_ref(), pair[1].as_ref());
            let range = RevisionRange::TwoDot {
                from: from.to_string(),
                to: to.to_string(),
            };
            let patches = self.count_patches(&range)?;
            debug!(from, to, patches, "Counted patches");
            volumes.push(PatchVolume {
                version: to.to_string(),
                patches,
            });
        }

        Ok(volumes)
    }
}

/// Iterator returned by [`FeatureExtractor::features`].
///
/// Uninformative commits are skipped. Two walked commits sharing a join key
/// are reported with a warning; both rows are still produced.
pub struct FeatureStream<'a> {
    extractor: &'a FeatureExtractor,
    walk: CommitWalk<'a>,
    options: FeatureOptions<'a>,
    seen: HashMap<String, Oid>,
    visited: usize,
    emitted: usize,
    finished: bool,
}

impl FeatureStream<'_> {
    fn check_collision(&mut self, commit: &Commit<'_>) {
        let key = self.extractor.key(commit);
        match self.seen.get(&key) {
            Some(previous) if *previous != commit.id() => {
                warn!(
                    hash = %key,
                    first = %previous,
                    second = %commit.id(),
                    "Join key collision, consider a longer hash_key_len"
                );
            }
            Some(_) => {}
            None => {
                self.seen.insert(key, commit.id());
            }
        }
    }
}

impl Iterator for FeatureStream<'_> {
    type Item = Result<FeatureRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let commit = match self.walk.next() {
                Some(Ok(commit)) => commit,
                Some(Err(e)) => return Some(Err(e)),
                None => {
                    if !self.finished {
                        self.finished = true;
                        info!(visited = self.visited, emitted = self.emitted, "Feature pass complete");
                    }
                    return None;
                }
            };
            self.visited += 1;
            self.check_collision(&commit);

            let screening = match self.extractor.filter.screen(&self.extractor.repo, &commit) {
                Ok(screening) => screening,
                Err(e) => return Some(Err(e)),
            };
            let Some(record) = self
                .extractor
                .screened_feature_vector(&commit, screening, &self.options)
            else {
                continue;
            };
            if record.is_ok() {
                self.emitted += 1;
            }
            return Some(record);
        }
    }
}
