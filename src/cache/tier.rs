//! Cache tier identifiers and per-tier configuration.
//!
//! The cache is organized as three tiers with progressively longer TTLs and
//! larger capacities. The hot tier answers the most recent traffic, the warm
//! tier holds the medium-term working set, and the cold tier is the long-tail
//! backstop that keeps the backing dataset out of the request path.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// One of the three cache tiers, ordered hottest to coldest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheTier {
    /// Short TTL, small capacity, checked first.
    #[default]
    Hot,
    /// Medium TTL and capacity.
    Warm,
    /// Long TTL, large capacity, checked last.
    Cold,
}

impl CacheTier {
    /// All tiers in lookup order (hottest first).
    pub fn lookup_order() -> &'static [CacheTier] {
        &[CacheTier::Hot, CacheTier::Warm, CacheTier::Cold]
    }

    /// The tier a hit in this tier is promoted into, if any.
    ///
    /// Promotion moves a record exactly one tier up per lookup: a warm hit
    /// is copied into hot, a cold hit into warm. Hot hits stay where they
    /// are.
    pub fn promotion_target(&self) -> Option<CacheTier> {
        match self {
            CacheTier::Hot => None,
            CacheTier::Warm => Some(CacheTier::Hot),
            CacheTier::Cold => Some(CacheTier::Warm),
        }
    }

    /// Human-readable tier name.
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheTier::Hot => "hot",
            CacheTier::Warm => "warm",
            CacheTier::Cold => "cold",
        }
    }
}

impl fmt::Display for CacheTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// TTL and capacity settings for a single tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierConfig {
    /// Which tier these settings apply to.
    pub tier: CacheTier,
    /// How long an entry written to this tier stays live.
    pub ttl: Duration,
    /// Entry count at which inserts trigger eviction.
    pub max_entries: usize,
}

impl TierConfig {
    /// Hot tier defaults: 5 minute TTL, 500 entries.
    pub fn hot_default() -> Self {
        Self {
            tier: CacheTier::Hot,
            ttl: Duration::from_secs(5 * 60),
            max_entries: 500,
        }
    }

    /// Warm tier defaults: 1 hour TTL, 5,000 entries.
    pub fn warm_default() -> Self {
        Self {
            tier: CacheTier::Warm,
            ttl: Duration::from_secs(60 * 60),
            max_entries: 5_000,
        }
    }

    /// Cold tier defaults: 24 hour TTL, 50,000 entries.
    pub fn cold_default() -> Self {
        Self {
            tier: CacheTier::Cold,
            ttl: Duration::from_secs(24 * 60 * 60),
            max_entries: 50_000,
        }
    }

    /// How many entries a capacity eviction tries to free: 20% of
    /// `max_entries`, never less than one so an insert at capacity always
    /// has room.
    pub fn eviction_target(&self) -> usize {
        (self.max_entries / 5).max(1)
    }
}

impl Default for TierConfig {
    fn default() -> Self {
        Self::hot_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_order() {
        assert_eq!(
            CacheTier::lookup_order(),
            &[CacheTier::Hot, CacheTier::Warm, CacheTier::Cold]
        );
    }

    #[test]
    fn test_promotion_target() {
        assert_eq!(CacheTier::Hot.promotion_target(), None);
        assert_eq!(CacheTier::Warm.promotion_target(), Some(CacheTier::Hot));
        assert_eq!(CacheTier::Cold.promotion_target(), Some(CacheTier::Warm));
    }

    #[test]
    fn test_defaults() {
        let hot = TierConfig::hot_default();
        assert_eq!(hot.ttl, Duration::from_secs(300));
        assert_eq!(hot.max_entries, 500);

        let warm = TierConfig::warm_default();
        assert_eq!(warm.ttl, Duration::from_secs(3_600));
        assert_eq!(warm.max_entries, 5_000);

        let cold = TierConfig::cold_default();
        assert_eq!(cold.ttl, Duration::from_secs(86_400));
        assert_eq!(cold.max_entries, 50_000);
    }

    #[test]
    fn test_eviction_target() {
        assert_eq!(TierConfig::hot_default().eviction_target(), 100);
        assert_eq!(TierConfig::warm_default().eviction_target(), 1_000);
        assert_eq!(TierConfig::cold_default().eviction_target(), 10_000);
    }

    #[test]
    fn test_eviction_target_minimum() {
        let tiny = TierConfig {
            tier: CacheTier::Hot,
            ttl: Duration::from_secs(1),
            max_entries: 3,
        };
        assert_eq!(tiny.eviction_target(), 1);
    }

    #[test]
    fn test_tier_serde() {
        assert_eq!(serde_json::to_string(&CacheTier::Hot).unwrap(), "\"hot\"");
        assert_eq!(serde_json::to_string(&CacheTier::Cold).unwrap(), "\"cold\"");
    }
}
