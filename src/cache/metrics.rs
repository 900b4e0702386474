//! Cache hit/miss accounting.
//!
//! Counters are relaxed atomics bumped on the lookup path and read only by
//! [`snapshot`](crate::cache::TieredCache::stats) consumers, so a snapshot
//! is consistent per counter but not across counters. That is fine for
//! monitoring; nothing branches on exact totals.

use crate::cache::tier::CacheTier;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Typical cache line size on x86_64 and aarch64.
pub const CACHE_LINE_SIZE: usize = 64;

/// Lookup and write counters, aligned to one cache line to keep the hot
/// path from false sharing with neighbors.
#[derive(Debug, Default)]
#[repr(C, align(64))]
pub struct CacheMetrics {
    pub hot_hits: AtomicU64,
    pub warm_hits: AtomicU64,
    pub cold_hits: AtomicU64,
    pub misses: AtomicU64,
    pub sets: AtomicU64,
    _padding: [u8; 24],
}

const _: () = assert!(std::mem::size_of::<CacheMetrics>() <= CACHE_LINE_SIZE);

impl CacheMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self, tier: CacheTier) {
        let counter = match tier {
            CacheTier::Hot => &self.hot_hits,
            CacheTier::Warm => &self.warm_hits,
            CacheTier::Cold => &self.cold_hits,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_set(&self) {
        self.sets.fetch_add(1, Ordering::Relaxed);
    }

    /// Zeroes every counter. Only `clear()` on the cache calls this.
    pub fn reset(&self) {
        self.hot_hits.store(0, Ordering::Relaxed);
        self.warm_hits.store(0, Ordering::Relaxed);
        self.cold_hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.sets.store(0, Ordering::Relaxed);
    }
}

/// Point-in-time view of the counters plus per-tier entry counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStatsSnapshot {
    pub hot_hits: u64,
    pub warm_hits: u64,
    pub cold_hits: u64,
    pub misses: u64,
    pub sets: u64,
    pub hot_entries: usize,
    pub warm_entries: usize,
    pub cold_entries: usize,
}

impl CacheStatsSnapshot {
    /// Hits across all tiers.
    pub fn hits(&self) -> u64 {
        self.hot_hits + self.warm_hits + self.cold_hits
    }

    /// Hits plus misses.
    pub fn requests(&self) -> u64 {
        self.hits() + self.misses
    }

    /// Hit rate as a percentage; zero when nothing has been looked up yet.
    pub fn hit_rate(&self) -> f64 {
        let requests = self.requests();
        if requests == 0 {
            return 0.0;
        }
        self.hits() as f64 / requests as f64 * 100.0
    }

    /// Entries across all tiers, expired-but-uncollected included.
    pub fn total_entries(&self) -> usize {
        self.hot_entries + self.warm_entries + self.cold_entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fits_one_cache_line() {
        assert!(std::mem::size_of::<CacheMetrics>() <= CACHE_LINE_SIZE);
        assert_eq!(std::mem::align_of::<CacheMetrics>(), CACHE_LINE_SIZE);
    }

    #[test]
    fn test_record_counters() {
        let metrics = CacheMetrics::new();
        metrics.record_hit(CacheTier::Hot);
        metrics.record_hit(CacheTier::Hot);
        metrics.record_hit(CacheTier::Warm);
        metrics.record_hit(CacheTier::Cold);
        metrics.record_miss();
        metrics.record_set();

        assert_eq!(metrics.hot_hits.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.warm_hits.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.cold_hits.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.misses.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.sets.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_reset() {
        let metrics = CacheMetrics::new();
        metrics.record_hit(CacheTier::Hot);
        metrics.record_miss();
        metrics.record_set();

        metrics.reset();
        assert_eq!(metrics.hot_hits.load(Ordering::Relaxed), 0);
        assert_eq!(metrics.misses.load(Ordering::Relaxed), 0);
        assert_eq!(metrics.sets.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_hit_rate() {
        let snapshot = CacheStatsSnapshot {
            hot_hits: 2,
            warm_hits: 1,
            cold_hits: 1,
            misses: 2,
            ..Default::default()
        };
        assert_eq!(snapshot.hits(), 4);
        assert_eq!(snapshot.requests(), 6);
        assert!((snapshot.hit_rate() - 66.666).abs() < 0.01);
    }

    #[test]
    fn test_hit_rate_empty() {
        assert_eq!(CacheStatsSnapshot::default().hit_rate(), 0.0);
    }
}
