//! Cache lifecycle events.
//!
//! Every externally observable cache transition is published on a broadcast
//! channel. Subscribers are optional; with no receivers, sends are dropped
//! without blocking the cache path. Slow receivers lag and lose events
//! rather than applying backpressure.

use crate::cache::entry::BinPrefix;
use crate::cache::tier::CacheTier;
use serde::{Deserialize, Serialize};

/// A cache state transition worth observing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum CacheEvent {
    /// A lookup found a live entry.
    Hit {
        key: String,
        tier: CacheTier,
        /// Whether the hit was copied one tier up.
        promoted: bool,
    },
    /// A lookup found nothing live in any tier.
    Miss { key: String },
    /// A record was written through all tiers.
    Set { key: String },
    /// A capacity eviction ran in one tier.
    Evicted {
        tier: CacheTier,
        expired: usize,
        displaced: usize,
    },
    /// A background sweep finished.
    SweepCompleted { removed: usize },
    /// The cache and its counters were reset.
    Cleared,
    /// The backing dataset finished loading.
    DatasetLoaded { entries: usize },
    /// The backing dataset failed to load; lookups degrade to unknown.
    DatasetLoadFailed { reason: String },
}

impl CacheEvent {
    pub fn hit(key: BinPrefix, tier: CacheTier, promoted: bool) -> Self {
        Self::Hit {
            key: key.to_string(),
            tier,
            promoted,
        }
    }

    pub fn miss(key: BinPrefix) -> Self {
        Self::Miss {
            key: key.to_string(),
        }
    }

    pub fn set(key: BinPrefix) -> Self {
        Self::Set {
            key: key.to_string(),
        }
    }

    /// Whether the event signals degraded operation.
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::DatasetLoadFailed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serde() {
        let event = CacheEvent::hit(BinPrefix::parse("411111").unwrap(), CacheTier::Warm, true);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "hit");
        assert_eq!(json["key"], "411111");
        assert_eq!(json["tier"], "warm");
        assert_eq!(json["promoted"], true);
    }

    #[test]
    fn test_degraded_classification() {
        assert!(CacheEvent::DatasetLoadFailed {
            reason: "parse error".into()
        }
        .is_degraded());
        assert!(!CacheEvent::Cleared.is_degraded());
        assert!(!CacheEvent::SweepCompleted { removed: 3 }.is_degraded());
    }
}
