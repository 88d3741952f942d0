// src/cli/extract.rs
// Repository commands: export, ortho, lifetimes, volume, inspect

use anyhow::{Context, Result, bail};
use fixtrail::config::FixtrailConfig;
use fixtrail::export;
use fixtrail::extractor::{FeatureExtractor, FeatureOptions};
use fixtrail::git::RevisionRange;
use fixtrail::labels::{LabelMode, ToolPolicy};
use std::path::Path;
use tracing::info;

fn open(repo: &Path, config: &FixtrailConfig) -> Result<FeatureExtractor> {
    FeatureExtractor::open(repo, config)
        .with_context(|| format!("Failed to open repository {}", repo.display()))
}

pub fn run_export(
    repo: &Path,
    out: &Path,
    range: &RevisionRange,
    with_message: bool,
    label: LabelMode,
    config: &FixtrailConfig,
) -> Result<()> {
    let extractor = open(repo, config)?;
    info!(repo = %repo.display(), range = %range, label = %label, "Exporting features");

    let fixed = match label {
        LabelMode::Fixes => Some(
            extractor
                .find_fixed_commits(range)
                .context("Failed to build fixed-commit index")?,
        ),
        LabelMode::Heuristic => None,
    };
    let options = FeatureOptions {
        fixed: fixed.as_ref(),
        tools: None,
        with_message,
    };

    let stats = export::export_features(&extractor, range, options, out)
        .with_context(|| format!("Failed to export features to {}", out.display()))?;
    println!("Exported {} commits to {}", stats.rows, out.display());
    Ok(())
}

pub fn run_ortho(
    repo: &Path,
    out: &Path,
    range: &RevisionRange,
    policy: ToolPolicy,
    config: &FixtrailConfig,
) -> Result<()> {
    let extractor = open(repo, config)?;

    let fixed = extractor
        .find_fixed_commits(range)
        .context("Failed to build fixed-commit index")?;
    let tools = extractor
        .find_fixed_commits_with_tool_indication(range, policy)
        .context("Failed to build tool-mention index")?;
    let options = FeatureOptions {
        fixed: Some(&fixed),
        tools: Some(&tools),
        with_message: false,
    };

    let stats = export::export_ortho(&extractor, range, options, out)
        .with_context(|| format!("Failed to export labels to {}", out.display()))?;
    println!(
        "Exported {} commits to {} ({} fixed, {} with tool mentions)",
        stats.rows,
        out.display(),
        fixed.len(),
        tools.len()
    );
    Ok(())
}

pub fn run_lifetimes(repo: &Path, out: &Path, range: &RevisionRange, config: &FixtrailConfig) -> Result<()> {
    let extractor = open(repo, config)?;
    let stats = export::export_lifetimes(&extractor, range, out)
        .with_context(|| format!("Failed to export bug lifetimes to {}", out.display()))?;
    println!("Exported {} bug lifetimes to {}", stats.rows, out.display());
    Ok(())
}

pub fn run_volume(repo: &Path, out: &Path, tags: &[String], config: &FixtrailConfig) -> Result<()> {
    if tags.len() < 2 {
        bail!("--tags needs at least two tags, got {}", tags.len());
    }
    let extractor = open(repo, config)?;
    let stats = export::export_volume(&extractor, tags, out)
        .with_context(|| format!("Failed to export patch volume to {}", out.display()))?;
    println!("Exported {} versions to {}", stats.rows, out.display());
    Ok(())
}

pub fn run_inspect(repo: &Path, range: &RevisionRange, json: bool, config: &FixtrailConfig) -> Result<()> {
    let extractor = open(repo, config)?;
    let options = FeatureOptions {
        with_message: true,
        ..FeatureOptions::default()
    };

    let Some(record) = extractor.features(range, options)?.next() else {
        bail!("No informative commit in range {range}");
    };
    let record = record.context("Failed to extract features")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    for (column, value) in record.header().iter().zip(record.to_row()) {
        if *column == "message" {
            println!("{column}:");
            for line in value.lines() {
                println!("    {line}");
            }
        } else {
            println!("{column:<16} {value}");
        }
    }
    Ok(())
}
