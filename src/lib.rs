//! # binlookup
//!
//! Card BIN (Bank Identification Number) resolution with a three-tier
//! in-memory cache in front of a lazily loaded dataset.
//!
//! The first six digits of a card number identify the issuer. This crate
//! normalizes whatever callers send (full PANs, separators, whitespace)
//! down to that six digit prefix and resolves it to issuer attributes,
//! keeping the backing dataset out of the request path almost entirely:
//!
//! ```text
//!   raw input
//!      |
//!      v
//!   normalize ----> tiered cache ----> lazy dataset loader
//!   (6 digits)      hot/warm/cold      (loaded once, on first miss)
//!                   5m / 1h / 24h
//! ```
//!
//! Records found in the dataset, and the "unknown" sentinel for prefixes
//! that are not, are written through all three tiers. Hits migrate one
//! tier up per lookup; a background sweeper collects expired entries.
//! Batches run in fixed concurrency windows with a per-item timeout.
//!
//! ```no_run
//! use binlookup::{JsonFileSource, LookupService};
//! use std::sync::Arc;
//!
//! # async fn example() -> binlookup::Result<()> {
//! let service = LookupService::new(Arc::new(JsonFileSource::new("data/bindata.json")));
//! let resolution = service.resolve("4111-1111-1111-1111").await?;
//! println!("{} issued by {}", resolution.bin, resolution.record.issuing_bank);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod dataset;
pub mod error;
pub mod service;

pub use cache::{
    BinPrefix, CacheEvent, CacheStatsSnapshot, CacheTier, Sweeper, SweeperConfig, TierConfig,
    TierHit, TieredCache, TieredCacheConfig,
};
pub use dataset::{
    BinDataset, BinRecord, DatasetInfo, DatasetLoader, DatasetSource, JsonFileSource, StaticSource,
};
pub use error::{Error, Result};
pub use service::{
    BatchOptions, LookupService, LookupServiceConfig, Resolution, ResolutionSource,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
