//! Per-file report writing.
//!
//! Each processed file becomes `<sample>_reads.csv`: a free-text run
//! summary row, a `#Feature,Reads` header, then one row per feature. The
//! summary row's wording is a stable contract — the downstream aggregation
//! stage parses its fields positionally.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Result;
use crate::stream::{FileReport, RunStats};

/// Sample name for a sequencing file path, with the compression and
/// format suffixes peeled off (`sample.fastq.gz` → `sample`).
#[must_use]
pub fn sample_stem(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    for suffix in [".fastq", ".fq"] {
        if let Some(stripped) = stem.strip_suffix(suffix) {
            return stripped.to_string();
        }
    }
    stem
}

/// Renders a wall-time span the way humans read it.
#[must_use]
pub fn human_duration(elapsed: Duration) -> String {
    let secs = elapsed.as_secs_f64();
    if secs > 3600.0 {
        format!("{:.2} hours", secs / 3600.0)
    } else if secs > 60.0 {
        format!("{:.2} minutes", secs / 60.0)
    } else {
        format!("{secs:.2} seconds")
    }
}

fn summary_line(sample: &str, stats: &RunStats) -> String {
    format!(
        "#script ran in {} for file {}. {} reads out of {} were aligned. \
         {} were perfectly aligned. {} were aligned with mismatch. \
         {} passed quality filtering but were not aligned. \
         {} did not pass quality filtering.",
        human_duration(stats.elapsed),
        sample,
        stats.aligned(),
        stats.reads,
        stats.perfect,
        stats.mismatched,
        stats.unmatched,
        stats.quality_failed,
    )
}

/// Writes one file's report into `dir`, returning the output path.
pub fn write_report(dir: &Path, report: &FileReport) -> Result<PathBuf> {
    let sample = sample_stem(&report.path);
    let out_path = dir.join(format!("{sample}_reads.csv"));
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_path(&out_path)?;

    writer.write_record([summary_line(&sample, &report.stats)])?;
    writer.write_record(["#Feature", "Reads"])?;
    for (name, count) in report.table.sorted_rows() {
        writer.write_record([name, count.to_string()])?;
    }
    writer.flush()?;
    Ok(out_path)
}
