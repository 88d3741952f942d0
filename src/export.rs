// src/export.rs
// CSV writers for the feature table and the auxiliary tables

use crate::error::Result;
use crate::extractor::{FeatureExtractor, FeatureOptions, PatchVolume};
use crate::features::FeatureRecord;
use crate::git::RevisionRange;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Columns of the auxiliary labeling table
pub const ORTHO_COLUMNS: &[&str] = &["commit_hash", "label", "tool_found"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportStats {
    pub rows: usize,
}

/// Write records row by row. The header is written even when there are no rows.
pub fn write_features<W, I>(writer: W, records: I, with_tool: bool, with_message: bool) -> Result<ExportStats>
where
    W: Write,
    I: IntoIterator<Item = Result<FeatureRecord>>,
{
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(FeatureRecord::columns(with_tool, with_message))?;

    let mut stats = ExportStats::default();
    for record in records {
        csv.write_record(record?.to_row())?;
        stats.rows += 1;
    }
    csv.flush()?;

    Ok(stats)
}

/// `commit_hash,label,tool_found` rows; records without a tool flag get 0
pub fn write_ortho<W, I>(writer: W, records: I) -> Result<ExportStats>
where
    W: Write,
    I: IntoIterator<Item = Result<FeatureRecord>>,
{
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(ORTHO_COLUMNS)?;

    let mut stats = ExportStats::default();
    for record in records {
        let record = record?;
        csv.write_record([
            record.metadata.commit_hash,
            record.label.to_string(),
            record.tool_found.unwrap_or(0).to_string(),
        ])?;
        stats.rows += 1;
    }
    csv.flush()?;

    Ok(stats)
}

pub fn write_lifetimes<W: Write>(writer: W, lifetimes: &[i64]) -> Result<ExportStats> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(["bug_lifetime_days"])?;
    for days in lifetimes {
        csv.write_record([days.to_string()])?;
    }
    csv.flush()?;

    Ok(ExportStats {
        rows: lifetimes.len(),
    })
}

pub fn write_volume<W: Write>(writer: W, volumes: &[PatchVolume]) -> Result<ExportStats> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(["version", "patches"])?;
    for volume in volumes {
        csv.write_record([volume.version.clone(), volume.patches.to_string()])?;
    }
    csv.flush()?;

    Ok(ExportStats {
        rows: volumes.len(),
    })
}

/// Stream the feature table of a range into `out`
pub fn export_features(
    extractor: &FeatureExtractor,
    range: &RevisionRange,
    options: FeatureOptions<'_>,
    out: &Path,
) -> Result<ExportStats> {
    let file = File::create(out)?;
    let records = extractor.features(range, options)?;
    let stats = write_features(file, records, options.tools.is_some(), options.with_message)?;
    info!(out = %out.display(), rows = stats.rows, "Exported features");
    Ok(stats)
}

/// Cross-reference labels plus tool flags for every informative commit
pub fn export_ortho(
    extractor: &FeatureExtractor,
    range: &RevisionRange,
    options: FeatureOptions<'_>,
    out: &Path,
) -> Result<ExportStats> {
    let file = File::create(out)?;
    let stats = write_ortho(file, extractor.features(range, options)?)?;
    info!(out = %out.display(), rows = stats.rows, "Exported labeling table");
    Ok(stats)
}

pub fn export_lifetimes(extractor: &FeatureExtractor, range: &RevisionRange, out: &Path) -> Result<ExportStats> {
    let lifetimes = extractor.extract_bug_lifetimes(range)?;
    let stats = write_lifetimes(File::create(out)?, &lifetimes)?;
    info!(out = %out.display(), rows = stats.rows, "Exported bug lifetimes");
    Ok(stats)
}

pub fn export_volume<S: AsRef<str>>(extractor: &FeatureExtractor, tags: &[S], out: &Path) -> Result<ExportStats> {
    let volumes = extractor.patch_volume(tags)?;
    let stats = write_volume(File::create(out)?, &volumes)?;
    info!(out = %out.display(), rows = stats.rows, "Exported patch volume");
    Ok(stats)
}
