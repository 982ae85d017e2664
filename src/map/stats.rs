//! Map Statistics Module
//!
//! Counters describing how entries were read and reclaimed.

use serde::Serialize;

// == Map Stats ==
/// Snapshot of expiring map counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MapStats {
    /// Lookups that returned a live value
    pub hits: u64,
    /// Lookups that found nothing (absent or expired)
    pub misses: u64,
    /// Entries deleted lazily because a lookup found them expired
    pub expirations: u64,
    /// Entries evicted to make room for a new key
    pub evictions: u64,
    /// Entries deleted by sweeps
    pub swept: u64,
    /// Current number of stored entries, expired or not
    pub total_entries: usize,
}

impl MapStats {
    /// Creates a MapStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if nothing was looked up.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub(crate) fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub(crate) fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub(crate) fn record_expiration(&mut self) {
        self.expirations += 1;
    }

    pub(crate) fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub(crate) fn record_swept(&mut self, count: usize) {
        self.swept += count as u64;
    }
}
