// src/error.rs
// Standardized error types for fixtrail

use thiserror::Error;

/// Main error type for the fixtrail library
#[derive(Error, Debug)]
pub enum FixtrailError {
    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid pattern: {0}")]
    Regex(#[from] regex::Error),

    #[error("invalid revision range '{range}': {reason}")]
    InvalidRange { range: String, reason: String },

    /// Diff extraction was asked for a commit the filter should have dropped
    #[error("commit {hash} has {parents} parents, diff features need exactly one")]
    Precondition { hash: String, parents: usize },

    #[error("diff parse error at line {line}: {reason}")]
    DiffParse { line: usize, reason: String },

    #[error("required column '{column}' not found in {table}")]
    MissingColumn { column: String, table: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Convenience type alias for Result using FixtrailError
pub type Result<T> = std::result::Result<T, FixtrailError>;

impl FixtrailError {
    pub(crate) fn diff_parse(line: usize, reason: impl Into<String>) -> Self {
        FixtrailError::DiffParse {
            line,
            reason: reason.into(),
        }
    }

    pub(crate) fn missing_column(column: &str, table: &str) -> Self {
        FixtrailError::MissingColumn {
            column: column.to_string(),
            table: table.to_string(),
        }
    }
}

impl From<String> for FixtrailError {
    fn from(s: String) -> Self {
        FixtrailError::InvalidInput(s)
    }
}
