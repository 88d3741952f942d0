// src/labels/mod.rs
// Bug-fix labeling
//
// - heuristic: keyword patterns over the commit message
// - fixes: `Fixes:` trailer scanning and the cross-reference index
// - tools: which fixes mention an analysis tool
// - lifetime: days from a buggy commit to its fix

pub mod fixes;
pub mod heuristic;
pub mod lifetime;
pub mod tools;

pub use fixes::{FixedHashIndex, FixesScanner};
pub use heuristic::HeuristicLabeler;
pub use lifetime::{extract_bug_lifetimes, lifetime_days};
pub use tools::{ToolIndex, ToolMatcher, ToolPolicy};

use std::fmt;

/// Labeling strategy selected on the command line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LabelMode {
    /// Keyword heuristics over the commit message
    #[default]
    Heuristic,
    /// Referenced by a `Fixes:` trailer elsewhere in the range
    Fixes,
}

impl fmt::Display for LabelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelMode::Heuristic => write!(f, "heuristic"),
            LabelMode::Fixes => write!(f, "fixes"),
        }
    }
}
