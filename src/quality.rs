//! Per-base quality filtering.

/// Offset of the printable Phred quality ladder (`!` encodes score 0).
const PHRED_OFFSET: u8 = 33;

/// Rejects a base window whenever any base's confidence falls below the
/// configured minimum Phred score.
///
/// The rejecting set is precomputed once from the Phred symbol ladder,
/// truncated at the configured minimum, so the per-read check is a plain
/// table probe per base.
#[derive(Debug, Clone)]
pub struct QualityGate {
    reject: [bool; 256],
    min_phred: u8,
}

impl QualityGate {
    /// Builds a gate for the given minimum Phred score.
    ///
    /// A configured minimum of 0 is treated as 1; a zero threshold would
    /// otherwise disable the filter entirely by accident.
    #[must_use]
    pub fn new(min_phred: u8) -> Self {
        let min_phred = min_phred.max(1);
        let mut reject = [false; 256];
        for (score, symbol) in (PHRED_OFFSET..=u8::MAX).enumerate() {
            if score < usize::from(min_phred) - 1 {
                reject[usize::from(symbol)] = true;
            }
        }
        Self { reject, min_phred }
    }

    /// The normalized minimum score this gate enforces.
    #[must_use]
    pub fn min_phred(&self) -> u8 {
        self.min_phred
    }

    /// True iff no base of the quality window falls in the rejecting set.
    #[must_use]
    pub fn passes(&self, quality: &[u8]) -> bool {
        !quality.iter().any(|&q| self.reject[usize::from(q)])
    }
}
