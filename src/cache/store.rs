//! Single-tier entry store.
//!
//! Each tier owns one [`TierStore`]: a mutex-protected map of prefix to
//! entry. The mutex is held only for map operations; callers clone records
//! out and never perform I/O under the lock. Reads skip expired entries but
//! leave them in place for the sweeper or the next capacity eviction to
//! collect, keeping the read path free of writes.

use crate::cache::entry::{BinPrefix, CacheEntry};
use crate::cache::tier::{CacheTier, TierConfig};
use crate::dataset::BinRecord;
use indexmap::IndexMap;
use parking_lot::Mutex;
use tokio::time::Instant;

/// Outcome of a capacity eviction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Eviction {
    /// Entries removed because their deadline had passed.
    pub expired: usize,
    /// Live entries removed oldest-deadline-first to reach the target.
    pub displaced: usize,
}

impl Eviction {
    /// Total entries removed.
    pub fn total(&self) -> usize {
        self.expired + self.displaced
    }
}

/// Mutex-protected entry map for one tier.
#[derive(Debug)]
pub struct TierStore {
    config: TierConfig,
    entries: Mutex<IndexMap<BinPrefix, CacheEntry>>,
}

impl TierStore {
    pub fn new(config: TierConfig) -> Self {
        Self {
            config,
            entries: Mutex::new(IndexMap::new()),
        }
    }

    pub fn tier(&self) -> CacheTier {
        self.config.tier
    }

    pub fn config(&self) -> &TierConfig {
        &self.config
    }

    /// Returns a copy of the live record for `key`.
    ///
    /// An entry past its deadline is treated as absent but not removed.
    pub fn get_live(&self, key: BinPrefix) -> Option<BinRecord> {
        let now = Instant::now();
        let entries = self.entries.lock();
        entries
            .get(&key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.record.clone())
    }

    /// Inserts `record` under `key` with this tier's TTL.
    ///
    /// When the tier is at capacity the insert first runs a two-phase
    /// eviction: drop every expired entry, then displace live entries in
    /// ascending deadline order until [`TierConfig::eviction_target`]
    /// entries are freed. Returns the eviction outcome when one ran.
    pub fn insert(&self, key: BinPrefix, record: BinRecord) -> Option<Eviction> {
        let now = Instant::now();
        let mut entries = self.entries.lock();

        let eviction = if entries.len() >= self.config.max_entries {
            Some(self.evict_locked(&mut entries, now))
        } else {
            None
        };

        entries.insert(
            key,
            CacheEntry {
                record,
                expires_at: now + self.config.ttl,
            },
        );
        eviction
    }

    fn evict_locked(&self, entries: &mut IndexMap<BinPrefix, CacheEntry>, now: Instant) -> Eviction {
        // Phase 1: every expired entry goes.
        let before = entries.len();
        entries.retain(|_, entry| entry.is_live(now));
        let expired = before - entries.len();

        // Phase 2: displace oldest-expiring live entries to reach the target.
        let target = self.config.eviction_target();
        let mut displaced = 0usize;
        if expired < target {
            let mut by_deadline: Vec<(BinPrefix, Instant)> = entries
                .iter()
                .map(|(key, entry)| (*key, entry.expires_at))
                .collect();
            by_deadline.sort_by_key(|(_, deadline)| *deadline);
            for (key, _) in by_deadline.into_iter().take(target - expired) {
                entries.swap_remove(&key);
                displaced += 1;
            }
        }

        Eviction { expired, displaced }
    }

    /// Removes every expired entry, returning how many were dropped.
    pub fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| entry.is_live(now));
        before - entries.len()
    }

    /// Entry count, expired entries included until collected.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}
