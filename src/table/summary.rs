// src/table/summary.rs
// Descriptive statistics for feature and prediction tables

use crate::error::{FixtrailError, Result};
use crate::table::{KEY_COLUMN, PROBABILITY_COLUMN, Table};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

/// count / mean / std / min / quartiles / max of one numeric column.
///
/// Missing cells are left out. `std` is the sample deviation and is NaN for
/// fewer than two values; every statistic is NaN for an empty column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStats {
    pub name: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub q50: f64,
    pub q75: f64,
    pub max: f64,
}

impl ColumnStats {
    pub fn from_values(name: impl Into<String>, values: &[f64]) -> Self {
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

        let count = sorted.len();
        let mean = if count == 0 {
            f64::NAN
        } else {
            sorted.iter().sum::<f64>() / count as f64
        };
        let std = if count < 2 {
            f64::NAN
        } else {
            let var = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
            var.sqrt()
        };

        Self {
            name: name.into(),
            count,
            mean,
            std,
            min: sorted.first().copied().unwrap_or(f64::NAN),
            q25: quantile(&sorted, 0.25),
            q50: quantile(&sorted, 0.5),
            q75: quantile(&sorted, 0.75),
            max: sorted.last().copied().unwrap_or(f64::NAN),
        }
    }
}

/// Linear-interpolation quantile of an ascending slice
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

fn present(values: Vec<Option<f64>>) -> Vec<f64> {
    values.into_iter().flatten().collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSummary {
    pub rows: usize,
    pub columns: usize,
    /// Label value and row count, most frequent first
    pub label_counts: Vec<(String, usize)>,
    /// Commits marked as fixed with a known tool, when the column exists
    pub tool_found_sum: Option<f64>,
    pub stats: Vec<ColumnStats>,
}

pub fn summarize_features(table: &Table) -> Result<FeatureSummary> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for label in table.column("label")? {
        if !label.trim().is_empty() {
            *counts.entry(label).or_default() += 1;
        }
    }
    let mut label_counts: Vec<(String, usize)> =
        counts.into_iter().map(|(label, n)| (label.to_string(), n)).collect();
    label_counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let tool_found_sum = if table.has_column("tool_found") {
        Some(present(table.numeric_column("tool_found")?).iter().sum())
    } else {
        None
    };

    let mut stats = Vec::new();
    for column in table.headers() {
        if table.is_numeric(column) {
            stats.push(ColumnStats::from_values(column, &present(table.numeric_column(column)?)));
        }
    }

    Ok(FeatureSummary {
        rows: table.len(),
        columns: table.headers().len(),
        label_counts,
        tool_found_sum,
        stats,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct PredictionSummary {
    pub stats: ColumnStats,
    /// Highest scoring `(commit_hash, probability)` pairs, best first
    pub top: Vec<(String, f64)>,
    /// 95th percentile of the probabilities
    pub threshold: f64,
    /// Commits at or above the threshold
    pub above_threshold: usize,
}

pub fn summarize_predictions(table: &Table, top_n: usize) -> Result<PredictionSummary> {
    let hashes = table.column(KEY_COLUMN)?;
    let probabilities = table.numeric_column(PROBABILITY_COLUMN)?;

    let mut scored: Vec<(String, f64)> = hashes
        .iter()
        .zip(&probabilities)
        .filter_map(|(hash, p)| p.map(|p| (hash.to_string(), p)))
        .collect();
    if scored.is_empty() {
        return Err(FixtrailError::InvalidInput(format!(
            "{}: no values in column '{PROBABILITY_COLUMN}'",
            table.name()
        )));
    }

    let values: Vec<f64> = scored.iter().map(|(_, p)| *p).collect();
    let stats = ColumnStats::from_values(PROBABILITY_COLUMN, &values);

    let mut sorted = values;
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let threshold = quantile(&sorted, 0.95);
    let above_threshold = sorted.iter().filter(|p| **p >= threshold).count();

    // Stable sort keeps table order among equal scores
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    scored.truncate(top_n);

    Ok(PredictionSummary {
        stats,
        top: scored,
        threshold,
        above_threshold,
    })
}

fn write_stats_header(f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(
        f,
        "{:<20} {:>8} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12}",
        "", "count", "mean", "std", "min", "25%", "50%", "75%", "max"
    )
}

impl fmt::Display for ColumnStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<20} {:>8} {:>12.4} {:>12.4} {:>12.4} {:>12.4} {:>12.4} {:>12.4} {:>12.4}",
            self.name, self.count, self.mean, self.std, self.min, self.q25, self.q50, self.q75, self.max
        )
    }
}

impl fmt::Display for FeatureSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Shape ===")?;
        writeln!(f, "Rows: {}, Columns: {}", self.rows, self.columns)?;

        writeln!(f)?;
        writeln!(f, "=== Label Distribution ===")?;
        for (label, count) in &self.label_counts {
            writeln!(f, "{label:<8} {count}")?;
        }

        if let Some(sum) = self.tool_found_sum {
            writeln!(f)?;
            writeln!(f, "=== Tool Found Summary ===")?;
            writeln!(f, "{sum} commits were marked as fixed using known tools.")?;
        }

        writeln!(f)?;
        writeln!(f, "=== Statistics ===")?;
        write_stats_header(f)?;
        for stats in &self.stats {
            writeln!(f, "{stats}")?;
        }
        Ok(())
    }
}

impl fmt::Display for PredictionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Prediction Summary ===")?;
        write_stats_header(f)?;
        writeln!(f, "{}", self.stats)?;

        writeln!(f)?;
        writeln!(f, "=== Top {} highest scoring commits ===", self.top.len())?;
        for (hash, probability) in &self.top {
            writeln!(f, "{hash}  {probability:.6}")?;
        }

        writeln!(f)?;
        writeln!(f, "Top 5% threshold: {:.3}", self.threshold)?;
        write!(f, "{} commits above threshold", self.above_threshold)
    }
}
