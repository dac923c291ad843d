//! Single-file stream processing.
//!
//! One worker, one file: records are consumed as 4-line groups straight off
//! the (transparently decompressed) byte stream, trimmed, quality-gated and
//! counted. Files far larger than memory stream through untouched; only the
//! feature table and the cache delta accumulate.

use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::cache::{MatchCache, MemoryGate};
use crate::config::{Config, Mode};
use crate::error::Result;
use crate::extract::Trimmer;
use crate::features::FeatureTable;
use crate::quality::QualityGate;

/// How often (in reads) the memory gate is re-evaluated.
pub const GATE_RECHECK_INTERVAL: u64 = 1_000_000;

/// Per-file counters, produced once per processed file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Total 4-line groups consumed.
    pub reads: u64,
    /// Reads matched by exact lookup (every extract-mode read lands here).
    pub perfect: u64,
    /// Reads matched through the mismatch fallback.
    pub mismatched: u64,
    /// Reads skipped by window resolution or the quality gate.
    pub quality_failed: u64,
    /// Reads that passed quality but matched no feature.
    pub unmatched: u64,
    /// Wall time spent on the file.
    pub elapsed: Duration,
}

impl RunStats {
    /// Reads matched either way.
    #[must_use]
    pub fn aligned(&self) -> u64 {
        self.perfect + self.mismatched
    }
}

/// Everything a worker hands back to the scheduler for one file.
#[derive(Debug, Clone)]
pub struct FileReport {
    pub path: PathBuf,
    pub stats: RunStats,
    pub table: FeatureTable,
    pub delta: MatchCache,
}

/// Reads one line into `buf`, stripping the terminator. Returns false at
/// end of stream, which also silently drops a trailing partial group.
fn read_line(reader: &mut impl BufRead, buf: &mut Vec<u8>) -> Result<bool> {
    buf.clear();
    if reader.read_until(b'\n', buf)? == 0 {
        return Ok(false);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
    }
    if buf.last() == Some(&b'\r') {
        buf.pop();
    }
    Ok(true)
}

/// Streams one sequencing file and accumulates per-feature counts.
///
/// `shared` is the worker's read-only cache snapshot for this batch; newly
/// resolved windows land in the returned delta (subject to the memory
/// gate). `read_cap` stops the stream after that many reads — the
/// scheduler's warm-up pass uses it to sample the smallest files cheaply.
pub fn process_file(
    path: &Path,
    mut table: FeatureTable,
    shared: &MatchCache,
    config: &Config,
    read_cap: Option<u64>,
) -> Result<FileReport> {
    let started = Instant::now();
    let trimmer = Trimmer::from_config(config);
    let gate = QualityGate::new(config.min_phred);

    let mut memory = MemoryGate::new();
    let mut allow_growth = memory.allow_growth();

    // files shorter than niffler's magic-byte probe are just empty streams
    let raw: Box<dyn Read> = match niffler::from_path(path) {
        Ok((raw, _format)) => raw,
        Err(niffler::Error::FileTooShort) => Box::new(io::empty()),
        Err(err) => return Err(err.into()),
    };
    let mut reader = BufReader::new(raw);

    let mut stats = RunStats::default();
    let mut delta = MatchCache::new();

    let mut skip = Vec::new();
    let mut sequence = Vec::new();
    let mut quality = Vec::new();

    loop {
        // identifier / sequence / separator / quality
        if !read_line(&mut reader, &mut skip)?
            || !read_line(&mut reader, &mut sequence)?
            || !read_line(&mut reader, &mut skip)?
            || !read_line(&mut reader, &mut quality)?
        {
            break;
        }
        stats.reads += 1;

        if let Some((start, end)) = trimmer.window(&sequence, &quality) {
            if end <= sequence.len() && end <= quality.len() {
                let window = sequence[start..end].to_ascii_uppercase();
                if gate.passes(&quality[start..end]) {
                    match config.mode {
                        Mode::Extract => {
                            table.observe(window);
                            stats.perfect += 1;
                        }
                        Mode::Count => {
                            if table.increment(&window) {
                                stats.perfect += 1;
                            } else if config.mismatches > 0 {
                                resolve_mismatch(
                                    &window,
                                    &mut table,
                                    shared,
                                    &mut delta,
                                    &mut stats,
                                    config.mismatches,
                                    allow_growth,
                                );
                            } else {
                                stats.unmatched += 1;
                            }
                        }
                    }
                } else {
                    stats.quality_failed += 1;
                }
            } else {
                stats.quality_failed += 1;
            }
        } else {
            stats.quality_failed += 1;
        }

        if stats.reads % GATE_RECHECK_INTERVAL == 0 {
            allow_growth = memory.allow_growth();
        }
        if read_cap.is_some_and(|cap| stats.reads >= cap) {
            break;
        }
    }

    stats.elapsed = started.elapsed();
    log::debug!(
        "{:?}: {} reads, {} aligned, {} unmatched, {} failed quality, {} cached",
        path,
        stats.reads,
        stats.aligned(),
        stats.unmatched,
        stats.quality_failed,
        delta.len()
    );
    Ok(FileReport {
        path: path.to_path_buf(),
        stats,
        table,
        delta,
    })
}

/// Cache-backed mismatch fallback for a window that missed exact lookup.
///
/// The scan runs once at the full configured budget; there is no
/// per-level escalation, so a window can never be resolved twice within
/// the handling of a single read.
fn resolve_mismatch(
    window: &[u8],
    table: &mut FeatureTable,
    shared: &MatchCache,
    delta: &mut MatchCache,
    stats: &mut RunStats,
    limit: u32,
    allow_growth: bool,
) {
    if let Some(feature) = delta
        .feature_for(window)
        .or_else(|| shared.feature_for(window))
    {
        let feature = feature.to_vec();
        table.increment(&feature);
        stats.mismatched += 1;
    } else if delta.is_failed(window) || shared.is_failed(window) {
        stats.unmatched += 1;
    } else {
        let hit = crate::encode::scan_features(table.sequences(), window, limit)
            .map(<[u8]>::to_vec);
        match hit {
            Some(feature) => {
                table.increment(&feature);
                stats.mismatched += 1;
                if allow_growth {
                    delta.record_pass(window.to_vec(), feature);
                }
            }
            None => {
                stats.unmatched += 1;
                if allow_growth {
                    delta.record_fail(window.to_vec());
                }
            }
        }
    }
}
