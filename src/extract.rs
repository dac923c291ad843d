//! Trim-window resolution.
//!
//! A [`Trimmer`] is built once per run from the configuration and resolves,
//! per read, the half-open window `[start, end)` holding the payload. The
//! window is either fixed (configured offset and length) or derived from
//! anchor sequences located inside the read. Any failure to resolve a
//! window means the read is skipped and counted as quality-rejected.

use crate::config::Config;
use crate::encode::{encode, find_anchor};
use crate::quality::QualityGate;

/// An anchor sequence with its own mismatch budget and quality threshold.
#[derive(Debug, Clone)]
struct Anchor {
    sequence: Vec<u8>,
    mismatches: u32,
    gate: QualityGate,
}

impl Anchor {
    fn new(sequence: &str, mismatches: u32, min_phred: u8) -> Self {
        Self {
            sequence: encode(sequence),
            mismatches,
            gate: QualityGate::new(min_phred),
        }
    }

    /// Locates the anchor in the read and gates the quality of the anchor
    /// region itself (not just the payload).
    fn locate(&self, sequence: &[u8], quality: &[u8]) -> Option<usize> {
        let pos = find_anchor(&self.sequence, sequence, self.mismatches)?;
        let span = quality.get(pos..pos + self.sequence.len())?;
        self.gate.passes(span).then_some(pos)
    }
}

#[derive(Debug, Clone)]
enum TrimKind {
    Fixed { start: usize, end: usize },
    Upstream { up: Anchor, length: usize },
    Downstream { down: Anchor, length: usize },
    Both { up: Anchor, down: Anchor },
}

/// Per-run trim-window resolver.
#[derive(Debug, Clone)]
pub struct Trimmer {
    kind: TrimKind,
}

impl Trimmer {
    /// Selects the trim mode once from the configuration: anchor-derived
    /// when any anchor is set, fixed otherwise.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let kind = match (&config.upstream, &config.downstream) {
            (None, None) => TrimKind::Fixed {
                start: config.trim_start,
                end: config.trim_start + config.trim_length,
            },
            (Some(up), None) => TrimKind::Upstream {
                up: Anchor::new(up, config.upstream_mismatches, config.upstream_min_phred),
                length: config.trim_length,
            },
            (None, Some(down)) => TrimKind::Downstream {
                down: Anchor::new(
                    down,
                    config.downstream_mismatches,
                    config.downstream_min_phred,
                ),
                length: config.trim_length,
            },
            (Some(up), Some(down)) => TrimKind::Both {
                up: Anchor::new(up, config.upstream_mismatches, config.upstream_min_phred),
                down: Anchor::new(
                    down,
                    config.downstream_mismatches,
                    config.downstream_min_phred,
                ),
            },
        };
        Self { kind }
    }

    /// Resolves the payload window for one read, or `None` to skip it.
    #[must_use]
    pub fn window(&self, sequence: &[u8], quality: &[u8]) -> Option<(usize, usize)> {
        match &self.kind {
            TrimKind::Fixed { start, end } => {
                (*end <= sequence.len()).then_some((*start, *end))
            }
            TrimKind::Upstream { up, length } => {
                let start = up.locate(sequence, quality)? + up.sequence.len();
                let end = start + length;
                (end <= sequence.len()).then_some((start, end))
            }
            TrimKind::Downstream { down, length } => {
                let end = down.locate(sequence, quality)?;
                let start = end.checked_sub(*length)?;
                Some((start, end))
            }
            TrimKind::Both { up, down } => {
                let start = up.locate(sequence, quality)? + up.sequence.len();
                let end = down.locate(sequence, quality)?;
                // the downstream match must not precede the upstream match
                (end >= start).then_some((start, end))
            }
        }
    }
}
