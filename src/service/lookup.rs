//! Single-key BIN resolution.
//!
//! [`LookupService`] is the assembled stack: input normalization in front
//! of the tiered cache in front of the lazily loaded dataset. Every
//! resolution goes through the same path, so by construction a repeated
//! prefix costs one dataset consultation for as long as any tier holds it.

use crate::cache::{
    BinPrefix, CacheEvent, CacheStatsSnapshot, CacheTier, Sweeper, SweeperConfig, TieredCache,
    TieredCacheConfig,
};
use crate::dataset::{BinRecord, DatasetInfo, DatasetLoader, DatasetSource};
use crate::error::Result;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info};

/// Settings for the assembled service.
#[derive(Debug, Clone, Default)]
pub struct LookupServiceConfig {
    pub cache: TieredCacheConfig,
    pub sweeper: SweeperConfig,
}

/// Where a resolution's record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionSource {
    /// Served by a cache tier without touching the dataset.
    Cache { tier: CacheTier },
    /// Resolved against the dataset and written back to the cache.
    Dataset,
}

impl ResolutionSource {
    pub fn is_cached(&self) -> bool {
        matches!(self, Self::Cache { .. })
    }
}

/// Outcome of resolving one raw input.
#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    /// Canonical six digit prefix the input normalized to.
    pub bin: BinPrefix,
    /// Issuer attributes; the unknown sentinel when the dataset has no row.
    pub record: BinRecord,
    pub source: ResolutionSource,
}

/// BIN resolution facade over the cache, the loader and the sweeper.
pub struct LookupService {
    cache: Arc<TieredCache>,
    loader: DatasetLoader,
    sweeper: Sweeper,
}

impl LookupService {
    /// Service with default tiers and sweep interval.
    ///
    /// Must be called from within a tokio runtime; the sweeper task is
    /// spawned here.
    pub fn new(source: Arc<dyn DatasetSource>) -> Arc<Self> {
        Self::with_config(LookupServiceConfig::default(), source)
    }

    pub fn with_config(config: LookupServiceConfig, source: Arc<dyn DatasetSource>) -> Arc<Self> {
        let cache = Arc::new(TieredCache::with_config(config.cache));
        let loader = DatasetLoader::with_events(source, cache.event_sender());
        let sweeper = Sweeper::spawn(cache.clone(), config.sweeper);
        info!("BIN lookup service ready");
        Arc::new(Self {
            cache,
            loader,
            sweeper,
        })
    }

    /// Resolves one raw input to issuer attributes.
    ///
    /// Invalid input fails before touching the cache or its counters. A
    /// miss consults the dataset, caches whatever comes back (the unknown
    /// sentinel included) and reports the resolution as fresh.
    pub async fn resolve(&self, raw: &str) -> Result<Resolution> {
        let bin = BinPrefix::parse(raw)?;

        if let Some(hit) = self.cache.get(bin) {
            debug!(bin = %bin, tier = %hit.tier, promoted = hit.promoted, "cache hit");
            return Ok(Resolution {
                bin,
                record: hit.record,
                source: ResolutionSource::Cache { tier: hit.tier },
            });
        }

        debug!(bin = %bin, "cache miss, consulting dataset");
        let record = self
            .loader
            .lookup(bin)
            .await
            .unwrap_or_else(BinRecord::unknown);
        self.cache.set(bin, record.clone());

        Ok(Resolution {
            bin,
            record,
            source: ResolutionSource::Dataset,
        })
    }

    /// Cache counters and per-tier sizes.
    pub fn stats(&self) -> CacheStatsSnapshot {
        self.cache.stats()
    }

    /// Dataset load outcome, `None` until the first miss forces a load.
    pub fn dataset_info(&self) -> Option<DatasetInfo> {
        self.loader.info()
    }

    /// Empties the cache and zeroes its counters.
    pub fn clear(&self) {
        self.cache.clear();
    }

    /// Subscribes to cache and dataset lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.cache.subscribe()
    }

    /// The underlying cache, for direct seeding or inspection.
    pub fn cache(&self) -> &TieredCache {
        &self.cache
    }

    /// Stops the background sweeper. Resolution keeps working afterwards;
    /// expired entries just wait for capacity evictions instead.
    pub async fn shutdown(&self) {
        self.sweeper.shutdown().await;
        info!("BIN lookup service stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{BinDataset, StaticSource};
    use crate::error::Error;
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use tokio_test::assert_ok;

    fn test_config() -> LookupServiceConfig {
        LookupServiceConfig {
            sweeper: SweeperConfig {
                enabled: false,
                ..SweeperConfig::default()
            },
            ..LookupServiceConfig::default()
        }
    }

    fn seeded_source() -> Arc<StaticSource> {
        let record = BinRecord {
            card_type: "Visa".to_string(),
            issuing_bank: "First Example Bank".to_string(),
            ..BinRecord::unknown()
        };
        Arc::new(StaticSource::from_pairs([(
            BinPrefix::parse("411111").unwrap(),
            record,
        )]))
    }

    struct FailingSource;

    #[async_trait]
    impl DatasetSource for FailingSource {
        async fn load(&self) -> Result<BinDataset> {
            Err(Error::DatasetLoad("no table".to_string()))
        }

        fn describe(&self) -> String {
            "failing".to_string()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_miss_then_hit() {
        let service = LookupService::with_config(test_config(), seeded_source());

        let first = service.resolve("4111-1111-2222-3333").await.unwrap();
        assert_eq!(first.bin.as_str(), "411111");
        assert_eq!(first.record.issuing_bank, "First Example Bank");
        assert_eq!(first.source, ResolutionSource::Dataset);

        let second = service.resolve("411111").await.unwrap();
        assert_eq!(
            second.source,
            ResolutionSource::Cache {
                tier: CacheTier::Hot
            }
        );
        assert_eq!(second.record, first.record);

        let stats = service.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.sets, 1);
        assert_eq!(stats.hot_hits, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sentinel_cached() {
        let service = LookupService::with_config(test_config(), seeded_source());

        let first = service.resolve("999999").await.unwrap();
        assert!(first.record.is_unknown());
        assert_eq!(first.source, ResolutionSource::Dataset);

        // The sentinel is cached like any record, so the dataset is not
        // consulted again for the same prefix.
        let second = service.resolve("999999").await.unwrap();
        assert!(second.record.is_unknown());
        assert!(second.source.is_cached());
        assert_eq!(service.stats().sets, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_input() {
        let service = LookupService::with_config(test_config(), seeded_source());

        assert_matches!(service.resolve("12").await, Err(Error::InvalidKey { .. }));
        assert_matches!(service.resolve("").await, Err(Error::InvalidKey { .. }));

        let stats = service.stats();
        assert_eq!(stats.requests(), 0);
        assert_eq!(stats.total_entries(), 0);
        // Nothing forced a dataset load either.
        assert!(service.dataset_info().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_degraded_resolution() {
        let service = LookupService::with_config(test_config(), Arc::new(FailingSource));
        let mut events = service.subscribe();

        let resolution = service.resolve("411111").await.unwrap();
        assert!(resolution.record.is_unknown());
        assert_eq!(resolution.source, ResolutionSource::Dataset);

        let info = service.dataset_info().unwrap();
        assert!(info.degraded);

        // The load failure went out on the shared event channel.
        let mut saw_failure = false;
        while let Ok(event) = events.try_recv() {
            saw_failure |= event.is_degraded();
        }
        assert!(saw_failure);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_then_reload() {
        let service = LookupService::with_config(test_config(), seeded_source());
        service.resolve("411111").await.unwrap();
        service.clear();

        let after = service.resolve("411111").await.unwrap();
        assert_eq!(after.source, ResolutionSource::Dataset);
        // Counters restarted with the clear.
        let stats = service.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.sets, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolution_serde() {
        let service = LookupService::with_config(test_config(), seeded_source());
        let resolution = service.resolve("411111").await.unwrap();

        let json = serde_json::to_value(&resolution).unwrap();
        assert_eq!(json["bin"], "411111");
        assert_eq!(json["record"]["cardType"], "Visa");
        assert_eq!(json["source"], "dataset");
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown() {
        let source = seeded_source();
        let service = LookupService::new(source);
        service.shutdown().await;

        // Lookups survive shutdown.
        assert_ok!(service.resolve("411111").await);
    }
}
