//! Run configuration.
//!
//! A single immutable [`Config`] value is passed explicitly into every
//! component that needs it; the engine holds no process-wide state.

/// Whether features are loaded up front or created from observed windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Match extracted windows against a preloaded feature table.
    #[default]
    Count,
    /// Treat every extracted window as a feature in its own right,
    /// creating table entries on first sight. No mismatch search.
    Extract,
}

/// Engine configuration, honored verbatim by every component.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum per-base differences for an approximate feature match.
    pub mismatches: u32,
    /// Minimum acceptable Phred score for the extracted window (0 coerces to 1).
    pub min_phred: u8,
    /// Fixed trim window offset into the read.
    pub trim_start: usize,
    /// Trim window length (also used by single-anchor windows).
    pub trim_length: usize,
    /// Optional upstream anchor sequence; case and whitespace are
    /// normalized when the trimmer encodes it.
    pub upstream: Option<String>,
    /// Optional downstream anchor sequence.
    pub downstream: Option<String>,
    /// Mismatch budget for locating the upstream anchor.
    pub upstream_mismatches: u32,
    /// Mismatch budget for locating the downstream anchor.
    pub downstream_mismatches: u32,
    /// Minimum Phred score over the upstream anchor region (0 coerces to 1).
    pub upstream_min_phred: u8,
    /// Minimum Phred score over the downstream anchor region (0 coerces to 1).
    pub downstream_min_phred: u8,
    /// Count-only or extract-and-count.
    pub mode: Mode,
    /// Worker pool size; `None` or 0 falls back to the core count minus a
    /// small reserve.
    pub workers: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mismatches: 1,
            min_phred: 30,
            trim_start: 0,
            trim_length: 20,
            upstream: None,
            downstream: None,
            upstream_mismatches: 0,
            downstream_mismatches: 0,
            upstream_min_phred: 30,
            downstream_min_phred: 30,
            mode: Mode::Count,
            workers: None,
        }
    }
}

impl Config {
    /// Resolves the worker pool size.
    ///
    /// An unset (or zero) worker count falls back to the available cores
    /// minus a small reserve: cores − 2 when three or more are available,
    /// otherwise 1. A configured count is clamped to the available cores.
    #[must_use]
    pub fn effective_workers(&self) -> usize {
        let available = num_cpus::get().max(1);
        match self.workers {
            Some(n) if n >= 1 => n.min(available),
            _ => {
                if available >= 3 {
                    available - 2
                } else {
                    1
                }
            }
        }
    }

    /// True when anchor-derived trimming is configured.
    #[must_use]
    pub fn anchored(&self) -> bool {
        self.upstream.is_some() || self.downstream.is_some()
    }
}
