// src/config/tables.rs
// Fixed lookup tables used by the extractors and labelers

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default `Fixes:` trailer pattern; group 1 captures the referenced hash
pub const DEFAULT_FIXES_PATTERN: &str = r"(?i)Fixes:\s*([0-9a-f]{7,40})";

/// Length of the truncated hash used as the join key
pub const DEFAULT_HASH_KEY_LEN: usize = 12;

/// Analysis tools whose mention in a fixing commit hints at automated discovery
pub const DEFAULT_TOOLS: &[&str] = &[
    "sparse",
    "smatch",
    "clang",
    "coverity",
    "checkpatch",
    "coccinelle",
    "gcc",
    "cppcheck",
    "valgrind",
    "kasan",
    "kcsan",
    "ubsan",
    "lockdep",
    "syzbot",
    "syzkaller",
];

/// Ordered bug-fix heuristics, matched against the lower-cased message
pub const DEFAULT_HEURISTIC_PATTERNS: &[&str] = &[
    r"\bfix(e[sd])?\b",
    r"\bbugs?\b",
    r"\bregressions?\b",
    r"\bcorrect(ed|ion)?\b",
    r"\bresolved?\b",
    r"cc:.*stable@",
    r"reported-by",
    r"fixes:",
];

/// Weight per top-level directory of the Linux tree.
///
/// Only `kernel` and `drivers` carry established weights. The rest are
/// placeholder estimates ranking core subsystems above tooling and docs;
/// override them under `[tables.dir_complexity]` for real experiments.
const DEFAULT_DIR_COMPLEXITY: &[(&str, f64)] = &[
    ("kernel", 9.0),
    ("mm", 8.5),
    ("ipc", 7.0),
    ("init", 7.0),
    ("block", 6.5),
    ("fs", 6.0),
    ("security", 6.0),
    ("net", 5.5),
    ("virt", 5.0),
    ("crypto", 4.5),
    ("arch", 4.0),
    ("lib", 4.0),
    ("include", 3.0),
    ("drivers", 2.25),
    ("sound", 1.5),
    ("certs", 1.0),
    ("rust", 1.0),
    ("usr", 1.0),
    ("io_uring", 6.5),
    ("scripts", 0.75),
    ("tools", 0.75),
    ("samples", 0.5),
    ("LICENSES", 0.0),
    ("Documentation", 0.25),
];

/// The seven trailer tags counted per commit message, in match order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trailer {
    SignedOff,
    ReviewedBy,
    TestedBy,
    ReportedBy,
    AckedBy,
    Cc,
    Link,
}

impl Trailer {
    pub const ALL: [Trailer; 7] = [
        Trailer::SignedOff,
        Trailer::ReviewedBy,
        Trailer::TestedBy,
        Trailer::ReportedBy,
        Trailer::AckedBy,
        Trailer::Cc,
        Trailer::Link,
    ];

    /// Column name in the feature table
    pub fn column(self) -> &'static str {
        match self {
            Trailer::SignedOff => "signed_off",
            Trailer::ReviewedBy => "reviewed_by",
            Trailer::TestedBy => "tested_by",
            Trailer::ReportedBy => "reported_by",
            Trailer::AckedBy => "acked_by",
            Trailer::Cc => "cc",
            Trailer::Link => "link",
        }
    }

    pub fn default_prefix(self) -> &'static str {
        match self {
            Trailer::SignedOff => "Signed-off-by",
            Trailer::ReviewedBy => "Reviewed-by",
            Trailer::TestedBy => "Tested-by",
            Trailer::ReportedBy => "Reported-by",
            Trailer::AckedBy => "Acked-by",
            Trailer::Cc => "CC:",
            Trailer::Link => "Link:",
        }
    }
}

/// Score per file change type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileImpact {
    pub new: u32,
    pub modified: u32,
    pub deleted: u32,
    pub unknown: u32,
}

impl Default for FileImpact {
    fn default() -> Self {
        Self {
            new: 5,
            modified: 2,
            deleted: 0,
            unknown: 0,
        }
    }
}

/// All lookup tables, injected into the extractors at construction time.
///
/// Every field falls back to the compiled default when a config file omits it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureTables {
    pub dir_complexity: BTreeMap<String, f64>,
    pub file_impact: FileImpact,
    pub tools: Vec<String>,
    /// Prefix overrides keyed by column name; unlisted trailers keep their default
    pub trailers: BTreeMap<String, String>,
    pub heuristic_patterns: Vec<String>,
    pub fixes_pattern: String,
}

impl Default for FeatureTables {
    fn default() -> Self {
        Self {
            dir_complexity: DEFAULT_DIR_COMPLEXITY
                .iter()
                .map(|(dir, weight)| (dir.to_string(), *weight))
                .collect(),
            file_impact: FileImpact::default(),
            tools: DEFAULT_TOOLS.iter().map(|t| t.to_string()).collect(),
            trailers: BTreeMap::new(),
            heuristic_patterns: DEFAULT_HEURISTIC_PATTERNS
                .iter()
                .map(|p| p.to_string())
                .collect(),
            fixes_pattern: DEFAULT_FIXES_PATTERN.to_string(),
        }
    }
}

impl FeatureTables {
    /// Trailer prefixes in match order, with overrides applied
    pub fn trailer_prefixes(&self) -> Vec<(Trailer, String)> {
        Trailer::ALL
            .iter()
            .map(|t| {
                let prefix = self
                    .trailers
                    .get(t.column())
                    .cloned()
                    .unwrap_or_else(|| t.default_prefix().to_string());
                (*t, prefix)
            })
            .collect()
    }

    /// Weight of a top-level directory; unlisted directories weigh nothing
    pub fn dir_weight(&self, top_level: &str) -> f64 {
        self.dir_complexity.get(top_level).copied().unwrap_or(0.0)
    }
}
