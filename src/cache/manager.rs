//! Three-tier cache with promotion on hit.
//!
//! [`TieredCache`] owns one [`TierStore`] per tier, the hit/miss counters
//! and the event channel. Lookups walk hot, warm, cold and stop at the
//! first live entry; hits below the hot tier are copied exactly one tier
//! up with the target tier's own TTL. Writes go through all three tiers so
//! a record entering the cache survives in cold long after hot has let it
//! go.

use crate::cache::entry::BinPrefix;
use crate::cache::events::CacheEvent;
use crate::cache::metrics::{CacheMetrics, CacheStatsSnapshot};
use crate::cache::store::TierStore;
use crate::cache::tier::{CacheTier, TierConfig};
use crate::cache::TierHit;
use crate::dataset::BinRecord;
use crate::error::{Error, Result};
use std::sync::atomic::Ordering;
use tokio::sync::broadcast;
use tracing::{debug, info};

/// Capacities and TTLs for the whole cache.
#[derive(Debug, Clone)]
pub struct TieredCacheConfig {
    pub hot: TierConfig,
    pub warm: TierConfig,
    pub cold: TierConfig,
    /// Broadcast buffer per subscriber before events are dropped.
    pub event_capacity: usize,
}

impl TieredCacheConfig {
    /// Rejects settings the tiers cannot operate with.
    pub fn validate(&self) -> Result<()> {
        for tier_config in [&self.hot, &self.warm, &self.cold] {
            if tier_config.max_entries == 0 {
                return Err(Error::Configuration(format!(
                    "{} tier capacity must be at least 1",
                    tier_config.tier
                )));
            }
            if tier_config.ttl.is_zero() {
                return Err(Error::Configuration(format!(
                    "{} tier TTL must be non-zero",
                    tier_config.tier
                )));
            }
        }
        Ok(())
    }
}

impl Default for TieredCacheConfig {
    fn default() -> Self {
        Self {
            hot: TierConfig::hot_default(),
            warm: TierConfig::warm_default(),
            cold: TierConfig::cold_default(),
            event_capacity: 1024,
        }
    }
}

/// Hot/warm/cold cache front for BIN records.
pub struct TieredCache {
    hot: TierStore,
    warm: TierStore,
    cold: TierStore,
    metrics: CacheMetrics,
    event_tx: broadcast::Sender<CacheEvent>,
}

impl TieredCache {
    pub fn new() -> Self {
        Self::with_config(TieredCacheConfig::default())
    }

    pub fn with_config(config: TieredCacheConfig) -> Self {
        let (event_tx, _) = broadcast::channel(config.event_capacity.max(1));
        Self {
            hot: TierStore::new(config.hot),
            warm: TierStore::new(config.warm),
            cold: TierStore::new(config.cold),
            metrics: CacheMetrics::new(),
            event_tx,
        }
    }

    /// Subscribes to cache lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.event_tx.subscribe()
    }

    pub(crate) fn event_sender(&self) -> broadcast::Sender<CacheEvent> {
        self.event_tx.clone()
    }

    /// Looks up `key`, hottest tier first.
    ///
    /// A warm hit is copied into hot, a cold hit into warm, each as a new
    /// entry carrying the receiving tier's TTL. Only one promotion happens
    /// per lookup; climbing from cold to hot takes two hits.
    pub fn get(&self, key: BinPrefix) -> Option<TierHit> {
        if let Some(record) = self.hot.get_live(key) {
            self.metrics.record_hit(CacheTier::Hot);
            self.emit(CacheEvent::hit(key, CacheTier::Hot, false));
            return Some(TierHit {
                record,
                tier: CacheTier::Hot,
                promoted: false,
            });
        }

        if let Some(record) = self.warm.get_live(key) {
            self.write_tier(&self.hot, key, record.clone());
            self.metrics.record_hit(CacheTier::Warm);
            self.emit(CacheEvent::hit(key, CacheTier::Warm, true));
            return Some(TierHit {
                record,
                tier: CacheTier::Warm,
                promoted: true,
            });
        }

        if let Some(record) = self.cold.get_live(key) {
            self.write_tier(&self.warm, key, record.clone());
            self.metrics.record_hit(CacheTier::Cold);
            self.emit(CacheEvent::hit(key, CacheTier::Cold, true));
            return Some(TierHit {
                record,
                tier: CacheTier::Cold,
                promoted: true,
            });
        }

        self.metrics.record_miss();
        self.emit(CacheEvent::miss(key));
        None
    }

    /// Writes `record` through all three tiers, coldest first.
    ///
    /// Each tier stamps its own TTL. The write is not atomic across tiers;
    /// a concurrent reader can observe the record in cold before it lands
    /// in hot, which only costs that reader a promotion.
    pub fn set(&self, key: BinPrefix, record: BinRecord) {
        self.write_tier(&self.cold, key, record.clone());
        self.write_tier(&self.warm, key, record.clone());
        self.write_tier(&self.hot, key, record);
        self.metrics.record_set();
        self.emit(CacheEvent::set(key));
    }

    fn write_tier(&self, store: &TierStore, key: BinPrefix, record: BinRecord) {
        if let Some(eviction) = store.insert(key, record) {
            debug!(
                tier = %store.tier(),
                expired = eviction.expired,
                displaced = eviction.displaced,
                "capacity eviction"
            );
            self.emit(CacheEvent::Evicted {
                tier: store.tier(),
                expired: eviction.expired,
                displaced: eviction.displaced,
            });
        }
    }

    /// Drops expired entries in every tier, returning the total removed.
    pub fn sweep_expired(&self) -> usize {
        let removed =
            self.hot.sweep_expired() + self.warm.sweep_expired() + self.cold.sweep_expired();
        if removed > 0 {
            debug!(removed, "swept expired cache entries");
        }
        self.emit(CacheEvent::SweepCompleted { removed });
        removed
    }

    /// Empties every tier and zeroes the counters.
    pub fn clear(&self) {
        self.hot.clear();
        self.warm.clear();
        self.cold.clear();
        self.metrics.reset();
        self.emit(CacheEvent::Cleared);
        info!("cache cleared");
    }

    /// Counter and size snapshot for monitoring.
    pub fn stats(&self) -> CacheStatsSnapshot {
        CacheStatsSnapshot {
            hot_hits: self.metrics.hot_hits.load(Ordering::Relaxed),
            warm_hits: self.metrics.warm_hits.load(Ordering::Relaxed),
            cold_hits: self.metrics.cold_hits.load(Ordering::Relaxed),
            misses: self.metrics.misses.load(Ordering::Relaxed),
            sets: self.metrics.sets.load(Ordering::Relaxed),
            hot_entries: self.hot.len(),
            warm_entries: self.warm.len(),
            cold_entries: self.cold.len(),
        }
    }

    fn emit(&self, event: CacheEvent) {
        // Nobody listening is fine.
        let _ = self.event_tx.send(event);
    }
}

impl Default for TieredCache {
    fn default() -> Self {
        Self::new()
    }
}
