//! Periodic background sweep of expired entries.
//!
//! Reads skip expired entries without removing them, so something has to
//! collect the garbage. The [`Sweeper`] ticks at a fixed interval and runs
//! [`TieredCache::sweep_expired`] across all tiers. It is a plain tokio
//! task held by a cancellation token; shutdown cancels and then waits for
//! the task to exit so no sweep races teardown.

use crate::cache::manager::TieredCache;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Background sweep settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweeperConfig {
    /// Disabled sweepers spawn no task at all.
    pub enabled: bool,
    /// Time between sweeps.
    pub interval: Duration,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: Duration::from_secs(300),
        }
    }
}

/// Handle to the background sweep task.
pub struct Sweeper {
    token: CancellationToken,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Sweeper {
    /// Spawns the sweep task, or a no-op handle when disabled.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(cache: Arc<TieredCache>, config: SweeperConfig) -> Self {
        let token = CancellationToken::new();
        let handle = if config.enabled {
            let worker_token = token.clone();
            Some(tokio::spawn(Self::run(cache, config.interval, worker_token)))
        } else {
            None
        };
        Self {
            token,
            handle: Mutex::new(handle),
        }
    }

    async fn run(cache: Arc<TieredCache>, interval: Duration, token: CancellationToken) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // An interval's first tick completes immediately; the first sweep
        // should wait a full period.
        ticker.tick().await;
        debug!(interval_secs = interval.as_secs(), "cache sweeper started");

        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    debug!("cache sweeper stopped");
                    break;
                }
                _ = ticker.tick() => {
                    cache.sweep_expired();
                }
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .lock()
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    /// Cancels the sweep task and waits for it to exit.
    pub async fn shutdown(&self) {
        self.token.cancel();
        let handle = self.handle.lock().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::entry::BinPrefix;
    use crate::cache::events::CacheEvent;
    use crate::dataset::BinRecord;
    use assert_matches::assert_matches;

    #[tokio::test(start_paused = true)]
    async fn test_periodic_sweep() {
        let cache = Arc::new(TieredCache::new());
        cache.set(BinPrefix::parse("411111").unwrap(), BinRecord::unknown());
        let mut rx = cache.subscribe();

        let sweeper = Sweeper::spawn(
            cache.clone(),
            SweeperConfig {
                enabled: true,
                interval: Duration::from_secs(400),
            },
        );

        // The paused clock advances to the first tick at 400s, past the hot
        // tier's 300s TTL, so the first sweep collects the hot entry.
        assert_matches!(
            rx.recv().await.unwrap(),
            CacheEvent::SweepCompleted { removed: 1 }
        );
        assert_eq!(cache.stats().hot_entries, 0);
        assert_eq!(cache.stats().warm_entries, 1);

        // Next tick at 800s finds nothing newly expired.
        assert_matches!(
            rx.recv().await.unwrap(),
            CacheEvent::SweepCompleted { removed: 0 }
        );

        sweeper.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled() {
        let cache = Arc::new(TieredCache::new());
        cache.set(BinPrefix::parse("411111").unwrap(), BinRecord::unknown());
        let mut rx = cache.subscribe();

        let sweeper = Sweeper::spawn(
            cache.clone(),
            SweeperConfig {
                enabled: false,
                interval: Duration::from_secs(1),
            },
        );
        assert!(!sweeper.is_running());

        tokio::time::advance(Duration::from_secs(600)).await;
        tokio::task::yield_now().await;
        assert!(rx.try_recv().is_err());
        // Entries stay until someone sweeps explicitly.
        assert_eq!(cache.stats().hot_entries, 1);

        sweeper.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown() {
        let cache = Arc::new(TieredCache::new());
        let mut rx = cache.subscribe();

        let sweeper = Sweeper::spawn(
            cache.clone(),
            SweeperConfig {
                enabled: true,
                interval: Duration::from_secs(100),
            },
        );
        assert!(sweeper.is_running());

        sweeper.shutdown().await;
        assert!(!sweeper.is_running());

        tokio::time::advance(Duration::from_secs(1_000)).await;
        tokio::task::yield_now().await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_idempotent() {
        let cache = Arc::new(TieredCache::new());
        let sweeper = Sweeper::spawn(cache, SweeperConfig::default());
        sweeper.shutdown().await;
        sweeper.shutdown().await;
    }
}
