// src/labels/heuristic.rs
// Keyword heuristics for bug-fix commits

use crate::error::Result;
use regex::Regex;

/// Ordered regex list matched against the lower-cased message
#[derive(Debug, Clone)]
pub struct HeuristicLabeler {
    patterns: Vec<Regex>,
}

impl HeuristicLabeler {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| Regex::new(p.as_ref()))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Index of the first pattern that matches, if any
    pub fn matching_pattern(&self, message: &str) -> Option<usize> {
        let message = message.to_lowercase();
        self.patterns.iter().position(|p| p.is_match(&message))
    }

    /// 1 for a suspected bug fix, 0 otherwise
    pub fn label(&self, message: &str) -> u8 {
        u8::from(self.matching_pattern(message).is_some())
    }
}
