//! Sequence codec and mismatch matching.
//!
//! Sequences are held as plain byte arrays (one byte per base) so that the
//! hot comparison loops are simple positional scans over `&[u8]`. The three
//! operations here are the innermost kernels of the whole engine: counting
//! mismatches between two equal-length sequences, scanning a read against
//! every feature, and locating an anchor inside a read.

/// Converts a user-supplied base sequence into its byte representation.
///
/// Whitespace is stripped and the sequence is uppercased, so features and
/// anchors compare cleanly against uppercased read windows.
#[must_use]
pub fn encode(sequence: &str) -> Vec<u8> {
    sequence
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .map(|b| b.to_ascii_uppercase())
        .collect()
}

/// Returns true when `a` and `b` differ in at most `limit` positions.
///
/// The scan exits as soon as the mismatch count exceeds `limit`. That early
/// exit carries the bulk of the engine's throughput: the common case is a
/// read that is nowhere near any feature, and it must fail fast.
///
/// Both slices must have equal length; in debug builds this is asserted.
#[must_use]
pub fn within_mismatch(a: &[u8], b: &[u8], limit: u32) -> bool {
    debug_assert_eq!(a.len(), b.len());
    let mut miss = 0;
    for (x, y) in a.iter().zip(b) {
        if x != y {
            miss += 1;
            if miss > limit {
                return false;
            }
        }
    }
    true
}

/// Compares `read` against every feature sequence and returns the unique
/// feature within `limit` mismatches, if any.
///
/// Ambiguity always wins over proximity: as soon as a second feature lies
/// within the budget the scan aborts with `None`, even if one of the two is
/// a strictly closer match. Ambiguous reads are discarded, never
/// double-counted or arbitrarily assigned.
///
/// Features whose length differs from the read cannot match and are skipped.
pub fn scan_features<'a, I>(features: I, read: &[u8], limit: u32) -> Option<&'a [u8]>
where
    I: IntoIterator<Item = &'a [u8]>,
{
    let mut hit = None;
    for feature in features {
        if feature.len() != read.len() {
            continue;
        }
        if within_mismatch(feature, read, limit) {
            if hit.is_some() {
                return None;
            }
            hit = Some(feature);
        }
    }
    hit
}

/// Slides `anchor` across `read` and returns the first (lowest) start
/// position matching within `limit` mismatches.
///
/// The last start index probed is `read.len() - anchor.len() - 1`; the scan
/// stops one position short of the final full fit, and a returned position
/// always leaves the whole anchor inside the read. First match wins; there
/// is no search for a globally best-scoring position.
#[must_use]
pub fn find_anchor(anchor: &[u8], read: &[u8], limit: u32) -> Option<usize> {
    if anchor.is_empty() || read.len() <= anchor.len() {
        return None;
    }
    let last = read.len() - anchor.len() - 1;
    (0..=last).find(|&pos| within_mismatch(anchor, &read[pos..pos + anchor.len()], limit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    /// Reference Hamming distance, no early exit.
    fn hamming(a: &[u8], b: &[u8]) -> u32 {
        a.iter().zip(b).filter(|(x, y)| x != y).count() as u32
    }

    #[test]
    fn encode_normalizes_case_and_whitespace() {
        assert_eq!(encode(" ac gt\n"), b"ACGT");
        assert_eq!(encode("ACGT"), b"ACGT");
        assert!(encode("").is_empty());
    }

    #[test]
    fn within_mismatch_matches_reference_hamming() {
        let mut rng = SmallRng::seed_from_u64(0xB10C0DE);
        for _ in 0..2000 {
            let len = rng.random_range(1..64);
            let a: Vec<u8> = (0..len).map(|_| rng.random_range(b'A'..=b'T')).collect();
            let b: Vec<u8> = (0..len).map(|_| rng.random_range(b'A'..=b'T')).collect();
            let limit = rng.random_range(0..8);
            assert_eq!(
                within_mismatch(&a, &b, limit),
                hamming(&a, &b) <= limit,
                "len={len} limit={limit}"
            );
        }
    }

    #[test]
    fn within_mismatch_exact_boundary() {
        assert!(within_mismatch(b"AAAA", b"AAAA", 0));
        assert!(!within_mismatch(b"AAAA", b"AAAT", 0));
        assert!(within_mismatch(b"AAAA", b"AAAT", 1));
        assert!(!within_mismatch(b"AAAA", b"AATT", 1));
    }

    #[test]
    fn scan_rejects_ambiguous_even_with_closer_match() {
        let features: Vec<&[u8]> = vec![b"AAAA", b"AAAT"];
        // read is an exact copy of the first feature, but the second is
        // still within the budget, so the read is ambiguous
        assert_eq!(scan_features(features.clone(), b"AAAA", 1), None);
        // with a zero budget only the exact copy survives
        assert_eq!(scan_features(features, b"AAAA", 0), Some(b"AAAA".as_slice()));
    }

    #[test]
    fn scan_skips_length_mismatched_features() {
        let features: Vec<&[u8]> = vec![b"AAAAA", b"CCCC"];
        assert_eq!(scan_features(features, b"CCCA", 1), Some(b"CCCC".as_slice()));
    }

    #[test]
    fn scan_finds_nothing_outside_budget() {
        let features: Vec<&[u8]> = vec![b"AAAA", b"CCCC"];
        assert_eq!(scan_features(features, b"GGGG", 1), None);
    }

    #[test]
    fn anchor_position_is_first_match() {
        assert_eq!(find_anchor(b"TT", b"AATTATTA", 0), Some(2));
        assert_eq!(find_anchor(b"TT", b"TTAAAAAA", 0), Some(0));
        assert_eq!(find_anchor(b"GG", b"AATTAATT", 0), None);
    }

    #[test]
    fn anchor_never_overruns_read() {
        let mut rng = SmallRng::seed_from_u64(0xA2C402);
        for _ in 0..500 {
            let rlen = rng.random_range(1..40);
            let alen = rng.random_range(1..8);
            let read: Vec<u8> = (0..rlen).map(|_| rng.random_range(b'A'..=b'T')).collect();
            let anchor: Vec<u8> = (0..alen).map(|_| rng.random_range(b'A'..=b'T')).collect();
            if let Some(pos) = find_anchor(&anchor, &read, 1) {
                assert!(pos + anchor.len() <= read.len());
                assert!(pos + anchor.len() < read.len(), "scan must stop short of the final fit");
            }
        }
    }

    #[test]
    fn anchor_requires_room_in_read() {
        // anchor as long as the read never matches
        assert_eq!(find_anchor(b"ACGT", b"ACGT", 0), None);
        assert_eq!(find_anchor(b"ACGTA", b"ACGT", 0), None);
        assert_eq!(find_anchor(b"", b"ACGT", 0), None);
    }
}
