//! Output formatting and persistence for analysis reports.
//!
//! Supports logging a summary, JSON serialization, and one CSV per chart series.

use anyhow::{Context, Result};
use csv::WriterBuilder;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::analyzers::types::{Report, Series};

/// Logs every series of the report, one line per point.
pub fn log_report(report: &Report) {
    info!(
        source = %report.source,
        rows = report.profile.rows,
        duplicates = report.profile.duplicate_rows,
        reason_mismatches = report.profile.reason_mismatches,
        unknown_statuses = report.profile.unknown_statuses,
        "Report"
    );
    for series in report.series() {
        for point in &series.points {
            info!(series = %series.title, label = %point.label, value = point.value);
        }
    }
    info!(
        q1 = report.outlier_bounds.q1,
        q3 = report.outlier_bounds.q3,
        lower_fence = report.outlier_bounds.lower_fence,
        upper_fence = report.outlier_bounds.upper_fence,
        inliers = report.inliers,
        outliers = report.outliers,
        "Fare outlier fences"
    );
    debug!("{:#?}", report);
}

/// Writes the report as pretty-printed JSON, replacing any existing file.
pub fn write_json(path: &str, report: &Report) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating '{path}'"))?;
    serde_json::to_writer_pretty(file, report)?;
    info!(path, "Report JSON written");
    Ok(())
}

/// Writes `series` to `<dir>/<title>.csv` with a `label,value` header.
///
/// Creates `dir` if it does not exist.
pub fn write_series_csv(dir: &str, series: &Series) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("creating directory '{dir}'"))?;
    let path = Path::new(dir).join(format!("{}.csv", series.title));
    debug!(path = %path.display(), points = series.points.len(), "Writing series CSV");

    let mut writer = WriterBuilder::new()
        .has_headers(true)
        .from_path(&path)
        .with_context(|| format!("creating '{}'", path.display()))?;

    for point in &series.points {
        writer.serialize(point)?;
    }
    writer.flush()?;

    Ok(path)
}
