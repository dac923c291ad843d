//! Batch scheduling across the worker pool.
//!
//! Files are dispatched in batches of pool size, one thread per file, each
//! worker owning a private feature table and a shared read-only cache
//! snapshot. The scheduler is the sole synchronization point: it joins the
//! whole batch, writes the per-file reports and merges the cache deltas
//! before the next batch starts, so later files benefit from every window
//! already resolved by earlier, smaller files.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use crate::cache::{MatchCache, MemoryGate};
use crate::config::Config;
use crate::error::{Result, ScheduleError};
use crate::features::FeatureTable;
use crate::output::write_report;
use crate::stream::{process_file, FileReport, RunStats};

/// Reads sampled per file by the cache warm-up pass.
pub const WARMUP_READ_CAP: u64 = 200_000;

/// Utilization above which a startup advisory is logged.
const STARTUP_MEMORY_WARNING_PERCENT: f64 = 75.0;

/// Processes every file, writing `<sample>_reads.csv` reports into
/// `out_dir`, and returns the per-file statistics in processing order.
///
/// Files are sorted ascending by on-disk size so the earliest batches (and
/// thus the earliest idle workers) take the cheapest files. When more than
/// one batch's worth of files is queued and the mismatch budget is nonzero,
/// a warm-up pass samples the smallest batch first to seed the match cache.
pub fn run(
    files: &[PathBuf],
    table: &FeatureTable,
    config: &Config,
    out_dir: &Path,
) -> Result<Vec<RunStats>> {
    if files.is_empty() {
        return Err(ScheduleError::EmptyFileSet.into());
    }
    fs::create_dir_all(out_dir)?;

    let mut files = files.to_vec();
    files.sort_by_key(|path| fs::metadata(path).map_or(u64::MAX, |meta| meta.len()));

    let mut memory = MemoryGate::new();
    if memory.utilization() >= STARTUP_MEMORY_WARNING_PERCENT {
        log::warn!("low memory availability detected; file processing may be slow");
    }

    let workers = config.effective_workers();
    let mut cache = MatchCache::new();

    if files.len() > workers && config.mismatches > 0 {
        log::info!("warming match cache on the {workers} smallest files");
        for report in run_batch(&files[..workers], table, &cache, config, Some(WARMUP_READ_CAP))? {
            cache.merge(report.delta);
        }
    }

    let mut all_stats = Vec::with_capacity(files.len());
    for (index, batch) in files.chunks(workers).enumerate() {
        log::info!("dispatching batch {} ({} files)", index + 1, batch.len());
        for report in run_batch(batch, table, &cache, config, None)? {
            write_report(out_dir, &report)?;
            all_stats.push(report.stats.clone());
            cache.merge(report.delta);
        }
        log::debug!(
            "match cache holds {} resolved windows after batch {}",
            cache.len(),
            index + 1
        );
    }
    Ok(all_stats)
}

/// Runs one batch, one thread per file, and joins them all.
///
/// Workers share an immutable snapshot of the canonical cache and hand
/// their deltas back by value; a failed or panicked worker aborts the run
/// naming its file, with no partial-batch retry.
fn run_batch(
    batch: &[PathBuf],
    table: &FeatureTable,
    cache: &MatchCache,
    config: &Config,
    read_cap: Option<u64>,
) -> Result<Vec<FileReport>> {
    let snapshot = Arc::new(cache.clone());

    let mut handles = Vec::with_capacity(batch.len());
    for path in batch {
        let path = path.clone();
        let table = table.clone();
        let snapshot = Arc::clone(&snapshot);
        let config = config.clone();
        let worker_path = path.clone();
        let handle =
            thread::spawn(move || process_file(&worker_path, table, &snapshot, &config, read_cap));
        handles.push((path, handle));
    }

    let mut reports = Vec::with_capacity(handles.len());
    for (path, handle) in handles {
        match handle.join() {
            Ok(Ok(report)) => reports.push(report),
            Ok(Err(source)) => {
                return Err(ScheduleError::WorkerFailed {
                    path,
                    source: Box::new(source),
                }
                .into())
            }
            Err(_) => return Err(ScheduleError::WorkerPanicked(path).into()),
        }
    }
    Ok(reports)
}
