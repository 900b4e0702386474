//! Backing dataset sources.
//!
//! A [`DatasetSource`] produces the full prefix-to-record map in one shot;
//! the loader memoizes it for the life of the process. The trait stays
//! narrow so embedding callers can plug in whatever holds their BIN table
//! without touching the cache or service layers.

use crate::cache::BinPrefix;
use crate::dataset::record::BinRecord;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::warn;

/// The fully loaded dataset, keyed by canonical prefix.
pub type BinDataset = HashMap<BinPrefix, BinRecord>;

/// Provider of the complete BIN dataset.
#[async_trait]
pub trait DatasetSource: Send + Sync {
    /// Loads the whole dataset. Called at most once per process.
    async fn load(&self) -> Result<BinDataset>;

    /// Where the data comes from, for logs.
    fn describe(&self) -> String;
}

/// Reads the dataset from a JSON file shaped as an object keyed by BIN
/// prefix strings.
///
/// Keys that do not normalize to a valid prefix are skipped with a
/// warning; one bad row should not take down the whole table.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DatasetSource for JsonFileSource {
    async fn load(&self) -> Result<BinDataset> {
        let bytes = tokio::fs::read(&self.path).await?;
        let raw: HashMap<String, BinRecord> = serde_json::from_slice(&bytes)?;

        let mut dataset = BinDataset::with_capacity(raw.len());
        let mut skipped = 0usize;
        for (key, record) in raw {
            match BinPrefix::parse(&key) {
                Ok(prefix) => {
                    dataset.insert(prefix, record);
                }
                Err(_) => skipped += 1,
            }
        }
        if skipped > 0 {
            warn!(
                skipped,
                path = %self.path.display(),
                "ignored dataset rows without a valid BIN prefix key"
            );
        }
        Ok(dataset)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory dataset, mainly for tests and embedded fixtures.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    entries: BinDataset,
}

impl StaticSource {
    pub fn new(entries: BinDataset) -> Self {
        Self { entries }
    }

    /// Builds a source from `(prefix, record)` pairs.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (BinPrefix, BinRecord)>,
    {
        Self {
            entries: pairs.into_iter().collect(),
        }
    }
}

#[async_trait]
impl DatasetSource for StaticSource {
    async fn load(&self) -> Result<BinDataset> {
        Ok(self.entries.clone())
    }

    fn describe(&self) -> String {
        format!("static dataset ({} entries)", self.entries.len())
    }
}
