//! Cache Statistics Module
//!
//! Tracks how often reads were served from memory and how often the sheet
//! had to be fetched.

use serde::Serialize;

// == Cache Stats ==
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct CacheStats {
    /// Reads served from a fresh entry
    pub hits: u64,
    /// Reads that required a fetch (absent, expired or invalidated entry)
    pub misses: u64,
    /// Successful fetches from the source
    pub fetches: u64,
    /// Failed fetches from the source
    pub fetch_errors: u64,
    /// Failed fetches answered with the previous snapshot
    pub stale_served: u64,
    /// Explicit invalidations
    pub invalidations: u64,
    /// Number of tables currently held
    pub total_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_fetch(&mut self) {
        self.fetches += 1;
    }

    pub fn record_fetch_error(&mut self) {
        self.fetch_errors += 1;
    }

    pub fn record_stale_served(&mut self) {
        self.stale_served += 1;
    }

    pub fn record_invalidation(&mut self) {
        self.invalidations += 1;
    }

    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = CacheStats::new();
        assert_eq!(stats, CacheStats::default());
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_hit();
        stats.record_hit();
        stats.record_miss();
        assert_eq!(stats.hit_rate(), 0.75);
    }

    #[test]
    fn test_counters() {
        let mut stats = CacheStats::new();
        stats.record_fetch();
        stats.record_fetch_error();
        stats.record_fetch_error();
        stats.record_stale_served();
        stats.record_invalidation();
        stats.set_total_entries(2);

        assert_eq!(stats.fetches, 1);
        assert_eq!(stats.fetch_errors, 2);
        assert_eq!(stats.stale_served, 1);
        assert_eq!(stats.invalidations, 1);
        assert_eq!(stats.total_entries, 2);
    }
}
