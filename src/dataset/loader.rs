//! Lazy, memoized dataset loading.
//!
//! Nothing reads the backing dataset at startup; the first lookup that
//! misses every cache tier triggers the load, and concurrent callers wait
//! for that one load instead of issuing their own. The result, success or
//! failure, is memoized for the life of the process. A failed load
//! degrades to an empty table so lookups resolve to the unknown sentinel
//! instead of erroring; the failure is logged and published once.

use crate::cache::{BinPrefix, CacheEvent};
use crate::dataset::record::BinRecord;
use crate::dataset::source::{BinDataset, DatasetSource};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{broadcast, OnceCell};
use tracing::{info, warn};

/// What the loader knows after the one load has happened.
#[derive(Debug, Clone, Serialize)]
pub struct DatasetInfo {
    /// Rows in the table; zero when degraded.
    pub entries: usize,
    /// Wall-clock time of the load attempt.
    pub loaded_at: DateTime<Utc>,
    /// True when the load failed and the table is the empty fallback.
    pub degraded: bool,
    /// Source description, as reported by [`DatasetSource::describe`].
    pub source: String,
}

/// Loads the dataset at most once and serves lookups from the result.
pub struct DatasetLoader {
    source: Arc<dyn DatasetSource>,
    dataset: OnceCell<BinDataset>,
    info: Mutex<Option<DatasetInfo>>,
    events: broadcast::Sender<CacheEvent>,
}

impl DatasetLoader {
    /// Loader with its own private event channel.
    pub fn new(source: Arc<dyn DatasetSource>) -> Self {
        let (events, _) = broadcast::channel(16);
        Self::with_events(source, events)
    }

    /// Loader publishing load outcomes on an existing event channel.
    pub fn with_events(
        source: Arc<dyn DatasetSource>,
        events: broadcast::Sender<CacheEvent>,
    ) -> Self {
        Self {
            source,
            dataset: OnceCell::new(),
            info: Mutex::new(None),
            events,
        }
    }

    /// Returns the dataset, loading it on first call.
    ///
    /// Exactly one caller runs the load; the rest await its completion.
    /// A failure is absorbed here: the loader logs, publishes
    /// [`CacheEvent::DatasetLoadFailed`] and memoizes an empty table.
    pub async fn load(&self) -> &BinDataset {
        self.dataset
            .get_or_init(|| async {
                match self.source.load().await {
                    Ok(dataset) => {
                        info!(
                            entries = dataset.len(),
                            source = %self.source.describe(),
                            "BIN dataset loaded"
                        );
                        self.record_info(dataset.len(), false);
                        let _ = self.events.send(CacheEvent::DatasetLoaded {
                            entries: dataset.len(),
                        });
                        dataset
                    }
                    Err(err) => {
                        warn!(
                            error = %err,
                            source = %self.source.describe(),
                            "BIN dataset failed to load; lookups degrade to unknown"
                        );
                        self.record_info(0, true);
                        let _ = self.events.send(CacheEvent::DatasetLoadFailed {
                            reason: err.to_string(),
                        });
                        BinDataset::new()
                    }
                }
            })
            .await
    }

    /// Looks up one prefix, loading the dataset first if needed.
    pub async fn lookup(&self, key: BinPrefix) -> Option<BinRecord> {
        self.load().await.get(&key).cloned()
    }

    /// Load outcome, `None` until the first load has run.
    pub fn info(&self) -> Option<DatasetInfo> {
        self.info.lock().clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.dataset.initialized()
    }

    fn record_info(&self, entries: usize, degraded: bool) {
        *self.info.lock() = Some(DatasetInfo {
            entries,
            loaded_at: Utc::now(),
            degraded,
            source: self.source.describe(),
        });
    }
}
