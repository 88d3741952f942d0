// src/labels/tools.rs
// Tool-mention index: did the fix for a commit mention an analysis tool?

use crate::error::{FixtrailError, Result};
use crate::git::{CommitWalk, RevisionRange};
use crate::labels::FixesScanner;
use git2::Repository;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use tracing::info;

/// Case-insensitive whole-word match over a list of tool names
#[derive(Debug, Clone)]
pub struct ToolMatcher {
    pattern: Regex,
}

impl ToolMatcher {
    pub fn new<S: AsRef<str>>(tools: &[S]) -> Result<Self> {
        if tools.is_empty() {
            return Err(FixtrailError::Config("tool list is empty".to_string()));
        }
        let alternation = tools
            .iter()
            .map(|t| regex::escape(t.as_ref()))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = Regex::new(&format!(r"(?i)\b({alternation})\b"))?;
        Ok(Self { pattern })
    }

    pub fn mentions_tool(&self, message: &str) -> bool {
        self.pattern.is_match(message)
    }
}

/// What to record when several commits fix the same buggy commit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ToolPolicy {
    /// The fixer visited last in walk order decides
    #[default]
    Last,
    /// The fixer visited first in walk order decides
    First,
    /// 1 if any fixer mentions a tool
    Any,
}

impl fmt::Display for ToolPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolPolicy::Last => write!(f, "last"),
            ToolPolicy::First => write!(f, "first"),
            ToolPolicy::Any => write!(f, "any"),
        }
    }
}

/// Buggy commit key -> 0/1 tool mention of its fixer. Built once, then read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolIndex {
    found: HashMap<String, u8>,
}

impl ToolIndex {
    pub fn build(
        repo: &Repository,
        range: &RevisionRange,
        scanner: &FixesScanner,
        matcher: &ToolMatcher,
        policy: ToolPolicy,
    ) -> Result<Self> {
        let mut index = Self::default();

        for commit in CommitWalk::new(repo, range, true)? {
            let commit = commit?;
            let message = String::from_utf8_lossy(commit.message_bytes());
            let references = scanner.references(&message);
            if references.is_empty() {
                continue;
            }

            let mentioned = u8::from(matcher.mentions_tool(&message));
            for key in references {
                index.record(key, mentioned, policy);
            }
        }

        info!(
            range = %range,
            entries = index.len(),
            with_tool = index.found.values().filter(|v| **v == 1).count(),
            policy = %policy,
            "Built tool-mention index"
        );
        Ok(index)
    }

    fn record(&mut self, key: String, mentioned: u8, policy: ToolPolicy) {
        match policy {
            ToolPolicy::Last => {
                self.found.insert(key, mentioned);
            }
            ToolPolicy::First => {
                self.found.entry(key).or_insert(mentioned);
            }
            ToolPolicy::Any => {
                let slot = self.found.entry(key).or_insert(0);
                *slot |= mentioned;
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<u8> {
        self.found.get(key).copied()
    }

    /// 0 for commits no fixer references
    pub fn tool_found(&self, key: &str) -> u8 {
        self.get(key).unwrap_or(0)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.found.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.found.len()
    }

    pub fn is_empty(&self) -> bool {
        self.found.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tables::DEFAULT_TOOLS;

    #[test]
    fn test_tool_matcher() {
        let matcher = ToolMatcher::new(DEFAULT_TOOLS).unwrap();
        assert!(matcher.mentions_tool("Reported-by: syzbot+abc@syzkaller.appspotmail.com"));
        assert!(matcher.mentions_tool("Found with Coccinelle"));
        assert!(matcher.mentions_tool("KASAN: slab-out-of-bounds"));
        assert!(!matcher.mentions_tool("sparsely populated tables"));
        assert!(!matcher.mentions_tool("nothing to see"));
    }

    #[test]
    fn test_empty_tool_list_rejected() {
        let empty: [&str; 0] = [];
        assert!(ToolMatcher::new(&empty).is_err());
    }

    #[test]
    fn test_policies() {
        let key = || "0123456789ab".to_string();

        let mut last = ToolIndex::default();
        last.record(key(), 1, ToolPolicy::Last);
        last.record(key(), 0, ToolPolicy::Last);
        assert_eq!(last.tool_found("0123456789ab"), 0);

        let mut first = ToolIndex::default();
        first.record(key(), 1, ToolPolicy::First);
        first.record(key(), 0, ToolPolicy::First);
        assert_eq!(first.tool_found("0123456789ab"), 1);

        let mut any = ToolIndex::default();
        any.record(key(), 0, ToolPolicy::Any);
        any.record(key(), 1, ToolPolicy::Any);
        any.record(key(), 0, ToolPolicy::Any);
        assert_eq!(any.tool_found("0123456789ab"), 1);
        assert_eq!(any.len(), 1);
    }

    #[test]
    fn test_unreferenced_key() {
        let index = ToolIndex::default();
        assert_eq!(index.get("fedcba987654"), None);
        assert_eq!(index.tool_found("fedcba987654"), 0);
    }
}
