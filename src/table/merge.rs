// src/table/merge.rs
// Joins on commit_hash

use crate::error::Result;
use crate::table::{KEY_COLUMN, Table};
use std::collections::HashMap;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    /// Every left row, with empty cells where the right side has no match
    Left,
    /// Only rows whose key appears on both sides
    Inner,
}

/// Join two tables on `on`.
///
/// Rows keep left order; a left row matching several right rows is repeated
/// once per match, in right order. Non-key columns present on both sides get
/// `_x` (left) and `_y` (right) suffixes.
pub fn join(left: &Table, right: &Table, on: &str, kind: JoinKind) -> Result<Table> {
    let left_key = left.require(on)?;
    let right_key = right.require(on)?;

    let right_columns: Vec<usize> = (0..right.headers().len()).filter(|i| *i != right_key).collect();

    let mut headers = Vec::with_capacity(left.headers().len() + right_columns.len());
    for (i, h) in left.headers().iter().enumerate() {
        let shared = i != left_key && right.has_column(h) && h != on;
        headers.push(if shared { format!("{h}_x") } else { h.clone() });
    }
    for i in &right_columns {
        let h = &right.headers()[*i];
        let shared = left.has_column(h);
        headers.push(if shared { format!("{h}_y") } else { h.clone() });
    }

    let mut by_key: HashMap<&str, Vec<usize>> = HashMap::new();
    for (i, row) in right.rows().iter().enumerate() {
        by_key.entry(row[right_key].as_str()).or_default().push(i);
    }

    let mut rows = Vec::new();
    for row in left.rows() {
        match by_key.get(row[left_key].as_str()) {
            Some(matches) => {
                for m in matches {
                    let other = &right.rows()[*m];
                    let mut joined = row.clone();
                    joined.extend(right_columns.iter().map(|i| other[*i].clone()));
                    rows.push(joined);
                }
            }
            None if kind == JoinKind::Left => {
                let mut joined = row.clone();
                joined.extend(right_columns.iter().map(|_| String::new()));
                rows.push(joined);
            }
            None => {}
        }
    }

    Table::new(left.name(), headers, rows)
}

/// Attach the commit message from a feature table to each prediction
pub fn merge_messages(features: &Table, predictions: &Table) -> Result<Table> {
    let messages = features.select(&[KEY_COLUMN, "message"])?;
    predictions.require(KEY_COLUMN)?;

    let merged = join(predictions, &messages, KEY_COLUMN, JoinKind::Left)?;
    info!(rows = merged.len(), "Merged messages into predictions");
    Ok(merged)
}

/// Predictions that also appear in the label table, with all columns of both
pub fn merge_labels(predictions: &Table, labels: &Table) -> Result<Table> {
    let merged = join(predictions, labels, KEY_COLUMN, JoinKind::Inner)?;
    info!(rows = merged.len(), "Merged predictions with labels");
    Ok(merged)
}
