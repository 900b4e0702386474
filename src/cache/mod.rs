//! Tiered caching engine for BIN records.
//!
//! Three independent tiers sit in front of the backing dataset. A lookup
//! walks them hottest first and stops at the first live entry; a write
//! lands in all three with each tier's own TTL. Hits below hot are copied
//! exactly one tier up, so frequently asked prefixes migrate toward the
//! short-TTL tier while one-off traffic ages out of cold on its own.
//!
//! ```text
//!   get(key)
//!      |
//!      v
//!   +------------+  miss   +------------+  miss   +--------------+  miss
//!   | hot        | ------> | warm       | ------> | cold         | ------> None
//!   | 5m / 500   |         | 1h / 5000  |         | 24h / 50000  |
//!   +------------+         +------------+         +--------------+
//!         ^                   |     ^                   |
//!         +---- hit copies ---+     +---- hit copies ---+
//!               entry up                  entry up
//! ```
//!
//! Expired entries are skipped on read and collected either by the
//! periodic [`Sweeper`] or lazily when a full tier evicts to make room.

pub mod entry;
pub mod events;
pub mod manager;
pub mod metrics;
pub mod store;
pub mod sweeper;
pub mod tier;

pub use entry::{BinPrefix, CacheEntry, BIN_PREFIX_LEN, MAX_INPUT_DIGITS, MIN_INPUT_DIGITS};
pub use events::CacheEvent;
pub use manager::{TieredCache, TieredCacheConfig};
pub use metrics::{CacheMetrics, CacheStatsSnapshot};
pub use store::{Eviction, TierStore};
pub use sweeper::{Sweeper, SweeperConfig};
pub use tier::{CacheTier, TierConfig};

use crate::dataset::BinRecord;

/// A successful cache lookup.
#[derive(Debug, Clone)]
pub struct TierHit {
    /// Copy of the cached record.
    pub record: BinRecord,
    /// Tier that answered.
    pub tier: CacheTier,
    /// Whether the record was copied one tier up as part of this lookup.
    pub promoted: bool,
}
