// src/features/record.rs
// Flat per-commit feature record and its table layout

use crate::config::Trailer;
use crate::features::{CommitMetadata, DiffFeatures, TrailerCounts};
use serde::Serialize;

/// Columns every feature table starts with, in order
const BASE_COLUMNS: &[&str] = &[
    "commit_hash",
    "author",
    "author_date",
    "committer",
    "commit_date",
    "commit_delay",
    "message_length",
];

const DIFF_COLUMNS: &[&str] = &["files_changed", "file_impact", "dir_complexity", "label"];

/// One row of the feature table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureRecord {
    #[serde(flatten)]
    pub metadata: CommitMetadata,
    #[serde(flatten)]
    pub trailers: TrailerCounts,
    #[serde(flatten)]
    pub diff: DiffFeatures,
    pub label: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_found: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FeatureRecord {
    /// Header for a table whose rows carry the given optional columns
    pub fn columns(with_tool: bool, with_message: bool) -> Vec<&'static str> {
        let mut columns: Vec<&'static str> = BASE_COLUMNS.to_vec();
        columns.extend(Trailer::ALL.iter().map(|t| t.column()));
        columns.push("by_sum");
        columns.extend_from_slice(DIFF_COLUMNS);
        if with_tool {
            columns.push("tool_found");
        }
        if with_message {
            columns.push("message");
        }
        columns
    }

    /// Header matching this record's optional columns
    pub fn header(&self) -> Vec<&'static str> {
        Self::columns(self.tool_found.is_some(), self.message.is_some())
    }

    /// Values in header order
    pub fn to_row(&self) -> Vec<String> {
        let m = &self.metadata;
        let mut row = vec![
            m.commit_hash.clone(),
            m.author.clone(),
            m.author_date.to_string(),
            m.committer.clone(),
            m.commit_date.to_string(),
            m.commit_delay.to_string(),
            m.message_length.to_string(),
        ];
        row.extend(Trailer::ALL.iter().map(|t| self.trailers.get(*t).to_string()));
        row.push(self.trailers.by_sum.to_string());
        row.push(self.diff.files_changed.to_string());
        row.push(self.diff.file_impact.to_string());
        row.push(format_float(self.diff.dir_complexity));
        row.push(self.label.to_string());
        if let Some(tool_found) = self.tool_found {
            row.push(tool_found.to_string());
        }
        if let Some(message) = &self.message {
            row.push(message.clone());
        }
        row
    }
}

/// Floats always keep a fractional part (`9.0`, `11.25`)
pub fn format_float(value: f64) -> String {
    format!("{value:?}")
}
