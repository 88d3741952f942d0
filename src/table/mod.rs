// src/table/mod.rs
// In-memory CSV tables for the post-processing utilities
//
// - merge: left and inner joins on commit_hash
// - evaluate: predictions against ground-truth labels
// - summary: feature and prediction table summaries
// - tools: tool mentions in high and low scoring groups

pub mod evaluate;
pub mod merge;
pub mod summary;
pub mod tools;

pub use evaluate::{CertainPredictions, ClassMetrics, Evaluation, evaluate};
pub use merge::{JoinKind, join, merge_labels, merge_messages};
pub use summary::{ColumnStats, FeatureSummary, PredictionSummary, summarize_features, summarize_predictions};
pub use tools::{GroupMentions, ToolMentionReport, tool_mentions};

use crate::error::{FixtrailError, Result};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::debug;

/// Join key shared by every table of the pipeline
pub const KEY_COLUMN: &str = "commit_hash";

/// Column written by the prediction routine
pub const PROBABILITY_COLUMN: &str = "bugfix_probability";

/// Header plus string rows. Empty cells stand for missing values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    name: String,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Build a table; every row must have one cell per header
    pub fn new(name: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        let name = name.into();
        if let Some(pos) = rows.iter().position(|row| row.len() != headers.len()) {
            return Err(FixtrailError::InvalidInput(format!(
                "{name}: row {} has {} cells, expected {}",
                pos + 1,
                rows[pos].len(),
                headers.len()
            )));
        }
        Ok(Self { name, headers, rows })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            FixtrailError::InvalidInput(format!("cannot open {}: {}", path.display(), e))
        })?;
        let table = Self::from_reader(path.display().to_string(), file)?;
        debug!(path = %path.display(), rows = table.len(), columns = table.headers.len(), "Loaded table");
        Ok(table)
    }

    pub fn from_reader<R: Read>(name: impl Into<String>, reader: R) -> Result<Self> {
        let mut csv = csv::Reader::from_reader(reader);
        let headers = csv.headers()?.iter().map(str::to_string).collect();
        let rows = csv
            .records()
            .map(|record| record.map(|r| r.iter().map(str::to_string).collect()))
            .collect::<std::result::Result<Vec<Vec<String>>, _>>()?;
        Self::new(name, headers, rows)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_index(column).is_some()
    }

    /// Index of a column that must be present
    pub fn require(&self, column: &str) -> Result<usize> {
        self.column_index(column)
            .ok_or_else(|| FixtrailError::missing_column(column, &self.name))
    }

    pub fn column(&self, column: &str) -> Result<Vec<&str>> {
        let idx = self.require(column)?;
        Ok(self.rows.iter().map(|row| row[idx].as_str()).collect())
    }

    /// Cells parsed as floats; empty cells are `None`, anything else unparseable is an error
    pub fn numeric_column(&self, column: &str) -> Result<Vec<Option<f64>>> {
        let idx = self.require(column)?;
        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| parse_cell(&row[idx]).map_err(|_| self.bad_cell(i, column, &row[idx])))
            .collect()
    }

    /// Whether every non-empty cell of a column parses as a number, with at least one value
    pub fn is_numeric(&self, column: &str) -> bool {
        let Some(idx) = self.column_index(column) else {
            return false;
        };
        let mut any = false;
        for row in &self.rows {
            match parse_cell(&row[idx]) {
                Ok(Some(_)) => any = true,
                Ok(None) => {}
                Err(_) => return false,
            }
        }
        any
    }

    /// New table with only the named columns, in the given order
    pub fn select(&self, columns: &[&str]) -> Result<Self> {
        let indices = columns
            .iter()
            .map(|c| self.require(c))
            .collect::<Result<Vec<_>>>()?;
        let rows = self
            .rows
            .iter()
            .map(|row| indices.iter().map(|i| row[*i].clone()).collect())
            .collect();
        Ok(Self {
            name: self.name.clone(),
            headers: columns.iter().map(|c| c.to_string()).collect(),
            rows,
        })
    }

    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(&self.headers)?;
        for row in &self.rows {
            csv.write_record(row)?;
        }
        csv.flush()?;
        Ok(())
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        self.write_to(File::create(path)?)?;
        debug!(path = %path.display(), rows = self.len(), "Wrote table");
        Ok(())
    }

    pub(crate) fn bad_cell(&self, row: usize, column: &str, value: &str) -> FixtrailError {
        FixtrailError::InvalidInput(format!(
            "{}: row {} column '{column}' is not a number: '{value}'",
            self.name,
            row + 1
        ))
    }
}

fn parse_cell(cell: &str) -> std::result::Result<Option<f64>, std::num::ParseFloatError> {
    let cell = cell.trim();
    if cell.is_empty() {
        return Ok(None);
    }
    cell.parse::<f64>().map(Some)
}

#[cfg(test)]
pub(crate) fn table(name: &str, csv: &str) -> Table {
    Table::from_reader(name, csv.as_bytes()).unwrap()
}
