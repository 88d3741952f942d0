// src/cli/tables.rs
// Table commands over exported and predicted CSV files

use anyhow::{Context, Result, bail};
use fixtrail::config::FixtrailConfig;
use fixtrail::labels::ToolMatcher;
use fixtrail::table::{self, Table};
use std::path::Path;

fn load(path: &Path) -> Result<Table> {
    Table::from_path(path).with_context(|| format!("Failed to read {}", path.display()))
}

pub fn run_merge_messages(features: &Path, predictions: &Path, out: &Path) -> Result<()> {
    let merged = table::merge_messages(&load(features)?, &load(predictions)?)?;
    merged
        .write(out)
        .with_context(|| format!("Failed to write {}", out.display()))?;
    println!("Merged file saved to {}", out.display());
    Ok(())
}

pub fn run_merge_labels(predictions: &Path, labels: &Path, out: &Path) -> Result<()> {
    let merged = table::merge_labels(&load(predictions)?, &load(labels)?)?;
    merged
        .write(out)
        .with_context(|| format!("Failed to write {}", out.display()))?;
    println!("Merged {} entries into {}", merged.len(), out.display());
    Ok(())
}

pub fn run_evaluate(labels: &Path, predictions: &Path, threshold: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&threshold) {
        bail!("--threshold must be between 0 and 1, got {threshold}");
    }
    let evaluation = table::evaluate(&load(labels)?, &load(predictions)?, threshold)?;
    println!("{evaluation}");
    Ok(())
}

pub fn run_summary(features: &Path) -> Result<()> {
    let summary = table::summarize_features(&load(features)?)?;
    print!("{summary}");
    Ok(())
}

pub fn run_predictions(predictions: &Path, top: usize) -> Result<()> {
    let summary = table::summarize_predictions(&load(predictions)?, top)?;
    println!("{summary}");
    Ok(())
}

pub fn run_tool_mentions(
    path: &Path,
    samples: usize,
    high: f64,
    low: f64,
    seed: u64,
    config: &FixtrailConfig,
) -> Result<()> {
    if low > high {
        bail!("--low ({low}) must not exceed --high ({high})");
    }
    let matcher = ToolMatcher::new(&config.tables.tools).context("Invalid tool list in config")?;
    let report = table::tool_mentions(&load(path)?, &matcher, samples, high, low, seed)?;
    println!("{report}");
    Ok(())
}
