// src/labels/fixes.rs
// `Fixes:` trailer scanning and the cross-reference index built from it

use crate::error::Result;
use crate::git::{CommitWalk, RevisionRange};
use git2::Repository;
use regex::Regex;
use std::collections::HashSet;
use tracing::info;

/// Finds `Fixes: <hash>` references in commit messages
#[derive(Debug, Clone)]
pub struct FixesScanner {
    pattern: Regex,
    key_len: usize,
}

impl FixesScanner {
    /// `pattern` must capture the referenced hash in group 1
    pub fn new(pattern: &str, key_len: usize) -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            key_len,
        })
    }

    pub fn key_len(&self) -> usize {
        self.key_len
    }

    /// Referenced hashes as written in the message, in order of appearance
    pub fn raw_references<'m>(&self, message: &'m str) -> Vec<&'m str> {
        self.pattern
            .captures_iter(message)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str())
            .collect()
    }

    /// Referenced hashes truncated to the join key
    pub fn references(&self, message: &str) -> Vec<String> {
        self.raw_references(message)
            .into_iter()
            .map(|hash| self.key(hash))
            .collect()
    }

    /// Join key of a hash string, lower-cased
    pub fn key(&self, hash: &str) -> String {
        hash.chars().take(self.key_len).collect::<String>().to_lowercase()
    }
}

/// Set of commit keys that some other commit in the range claims to fix.
///
/// Built by one full pass over the range, then only read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixedHashIndex {
    keys: HashSet<String>,
}

impl FixedHashIndex {
    pub fn build(repo: &Repository, range: &RevisionRange, scanner: &FixesScanner) -> Result<Self> {
        let mut keys = HashSet::new();
        let mut scanned = 0usize;

        for commit in CommitWalk::new(repo, range, true)? {
            let commit = commit?;
            let message = String::from_utf8_lossy(commit.message_bytes());
            keys.extend(scanner.references(&message));
            scanned += 1;
        }

        info!(range = %range, scanned, fixed = keys.len(), "Built fixed-commit index");
        Ok(Self { keys })
    }

    pub fn from_keys<I: IntoIterator<Item = String>>(keys: I) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// 1 when the commit is referenced by a `Fixes:` trailer
    pub fn label(&self, key: &str) -> u8 {
        u8::from(self.contains(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tables::DEFAULT_FIXES_PATTERN;

    fn scanner() -> FixesScanner {
        FixesScanner::new(DEFAULT_FIXES_PATTERN, 12).unwrap()
    }

    #[test]
    fn test_references_truncate() {
        let message = "\
net: fix it

Fixes: 0123456789abcdef0123 (\"net: break it\")
fixes:fedcba9876543
Signed-off-by: X
";
        assert_eq!(
            scanner().references(message),
            vec!["0123456789ab".to_string(), "fedcba987654".to_string()]
        );
    }

    #[test]
    fn test_short_reference_is_kept_whole() {
        assert_eq!(scanner().references("Fixes: abcdef1"), vec!["abcdef1".to_string()]);
    }

    #[test]
    fn test_too_short_or_not_hex() {
        assert!(scanner().references("Fixes: abc123").is_empty());
        assert!(scanner().references("Fixes: the build").is_empty());
    }

    #[test]
    fn test_uppercase_hash_normalized() {
        assert_eq!(
            scanner().references("FIXES: 0123456789ABCDEF"),
            vec!["0123456789ab".to_string()]
        );
    }

    #[test]
    fn test_index_lookup() {
        let index = FixedHashIndex::from_keys(["0123456789ab".to_string()]);
        assert_eq!(index.label("0123456789ab"), 1);
        assert_eq!(index.label("fedcba987654"), 0);
        assert_eq!(index.len(), 1);
        assert!(!index.is_empty());
    }
}
