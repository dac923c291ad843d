//! Content-addressed memory of resolved reads, plus the RAM governor that
//! gates its growth.
//!
//! Expensive conclusions — "this window matches nothing" and "this window
//! matches feature X within the budget" — are computed once and reused.
//! Workers look up a shared snapshot and accumulate their own delta; the
//! scheduler merges deltas between batches, so no concurrent mutation ever
//! occurs.

use std::collections::{HashMap, HashSet};

use sysinfo::System;

/// Memory of previously resolved read windows.
///
/// `failed` holds windows proven to match no feature within the configured
/// budget; `passed` maps windows to the unique feature they matched. A
/// window never appears in both, and entries are immutable once written:
/// there is no eviction, only conditional admission.
#[derive(Debug, Clone, Default)]
pub struct MatchCache {
    failed: HashSet<Vec<u8>>,
    passed: HashMap<Vec<u8>, Vec<u8>>,
}

impl MatchCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The feature key a window was previously resolved to, if any.
    #[must_use]
    pub fn feature_for(&self, window: &[u8]) -> Option<&[u8]> {
        self.passed.get(window).map(Vec::as_slice)
    }

    /// True when the window was previously proven unmatched.
    #[must_use]
    pub fn is_failed(&self, window: &[u8]) -> bool {
        self.failed.contains(window)
    }

    /// Records a window → feature resolution. Existing entries win.
    pub fn record_pass(&mut self, window: Vec<u8>, feature: Vec<u8>) {
        if !self.failed.contains(&window) {
            self.passed.entry(window).or_insert(feature);
        }
    }

    /// Records a window as proven unmatched.
    pub fn record_fail(&mut self, window: Vec<u8>) {
        if !self.passed.contains_key(&window) {
            self.failed.insert(window);
        }
    }

    /// Merges a worker's delta: `failed` is a set union, `passed` a map
    /// union where the first writer wins on key collision. The reduction is
    /// commutative and associative, so batch merge order does not matter.
    pub fn merge(&mut self, delta: MatchCache) {
        for (window, feature) in delta.passed {
            self.record_pass(window, feature);
        }
        for window in delta.failed {
            self.record_fail(window);
        }
    }

    /// Number of resolved windows (both outcomes).
    #[must_use]
    pub fn len(&self) -> usize {
        self.failed.len() + self.passed.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.failed.is_empty() && self.passed.is_empty()
    }
}

/// Utilization at or above which cache growth is suppressed.
const GROWTH_CEILING_PERCENT: f64 = 95.0;

/// Process-wide soft gate on cache growth.
///
/// Evaluated per worker against the host's live memory metric; it is a
/// local heuristic, not a coordinated budget. Lookups always proceed even
/// when growth is disabled — only new admissions are suppressed, so memory
/// pressure degrades speed, never counting accuracy.
pub struct MemoryGate {
    system: System,
}

impl MemoryGate {
    #[must_use]
    pub fn new() -> Self {
        Self {
            system: System::new(),
        }
    }

    /// Live system memory utilization in percent.
    pub fn utilization(&mut self) -> f64 {
        self.system.refresh_memory();
        let total = self.system.total_memory();
        if total == 0 {
            return 0.0;
        }
        self.system.used_memory() as f64 / total as f64 * 100.0
    }

    /// True while the cache may still admit new entries.
    pub fn allow_growth(&mut self) -> bool {
        self.utilization() < GROWTH_CEILING_PERCENT
    }
}

impl Default for MemoryGate {
    fn default() -> Self {
        Self::new()
    }
}
