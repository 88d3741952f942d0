// src/git/range.rs
// Revision range expressions (`rev`, `a..b`, `a...b`)

use crate::error::{FixtrailError, Result};
use std::fmt;
use std::str::FromStr;

/// A parsed revision range.
///
/// Empty sides default to `HEAD`, as in `git log v6.0..`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevisionRange {
    /// Everything reachable from one revision
    Single(String),
    /// Reachable from `to` but not from `from`
    TwoDot { from: String, to: String },
    /// Reachable from either side but not from their merge bases
    ThreeDot { left: String, right: String },
}

impl RevisionRange {
    pub fn parse(spec: &str) -> Result<Self> {
        let spec = spec.trim();
        if spec.is_empty() {
            return Err(invalid(spec, "empty range"));
        }

        let range = if let Some((left, right)) = spec.split_once("...") {
            RevisionRange::ThreeDot {
                left: side(spec, left)?,
                right: side(spec, right)?,
            }
        } else if let Some((from, to)) = spec.split_once("..") {
            RevisionRange::TwoDot {
                from: side(spec, from)?,
                to: side(spec, to)?,
            }
        } else {
            validate_ref(spec, spec)?;
            RevisionRange::Single(spec.to_string())
        };

        Ok(range)
    }
}

fn invalid(spec: &str, reason: &str) -> FixtrailError {
    FixtrailError::InvalidRange {
        range: spec.to_string(),
        reason: reason.to_string(),
    }
}

fn side(spec: &str, rev: &str) -> Result<String> {
    if rev.is_empty() {
        return Ok("HEAD".to_string());
    }
    if rev.starts_with('.') || rev.contains("..") {
        return Err(invalid(spec, "too many dots"));
    }
    validate_ref(spec, rev)?;
    Ok(rev.to_string())
}

/// Validate that a ref doesn't look like a CLI flag or carry control characters
fn validate_ref(spec: &str, rev: &str) -> Result<()> {
    if rev.starts_with('-') {
        return Err(invalid(spec, "revision looks like a flag"));
    }
    if rev.chars().any(|c| c.is_whitespace() || c == '\0') {
        return Err(invalid(spec, "revision contains forbidden characters"));
    }
    Ok(())
}

impl FromStr for RevisionRange {
    type Err = FixtrailError;

    fn from_str(s: &str) -> Result<Self> {
        RevisionRange::parse(s)
    }
}

impl fmt::Display for RevisionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RevisionRange::Single(rev) => write!(f, "{rev}"),
            RevisionRange::TwoDot { from, to } => write!(f, "{from}..{to}"),
            RevisionRange::ThreeDot { left, right } => write!(f, "{left}...{right}"),
        }
    }
}
