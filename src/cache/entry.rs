//! Cache keys and entries.
//!
//! A [`BinPrefix`] is the canonical six digit key every lookup is reduced
//! to. Raw caller input arrives with separators, whitespace or extra PAN
//! digits; normalization strips everything that is not a digit, validates
//! the digit count and keeps the first six. Two raw inputs that share those
//! six digits are the same key and share cache entries.

use crate::dataset::BinRecord;
use crate::error::{Error, Result};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tokio::time::Instant;

/// Number of digits in a canonical BIN prefix.
pub const BIN_PREFIX_LEN: usize = 6;

/// Fewest digits a raw input may carry after normalization.
pub const MIN_INPUT_DIGITS: usize = 6;

/// Most digits a raw input may carry after normalization (full PAN length).
pub const MAX_INPUT_DIGITS: usize = 19;

/// Canonical six digit BIN prefix, always ASCII digits.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BinPrefix([u8; BIN_PREFIX_LEN]);

impl BinPrefix {
    /// Normalizes raw caller input into a canonical prefix.
    ///
    /// Strips every non-digit character, then requires between
    /// [`MIN_INPUT_DIGITS`] and [`MAX_INPUT_DIGITS`] digits. The first six
    /// digits become the key. Rejected input never touches the cache.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Err(Error::invalid_key(raw, "BIN is required"));
        }

        let mut digits = [0u8; BIN_PREFIX_LEN];
        let mut count = 0usize;
        for byte in raw.bytes() {
            if byte.is_ascii_digit() {
                if count < BIN_PREFIX_LEN {
                    digits[count] = byte;
                }
                count += 1;
            }
        }

        if count < MIN_INPUT_DIGITS {
            return Err(Error::invalid_key(raw, "BIN must be at least 6 digits"));
        }
        if count > MAX_INPUT_DIGITS {
            return Err(Error::invalid_key(raw, "BIN too long"));
        }

        Ok(Self(digits))
    }

    /// The prefix as a string slice.
    pub fn as_str(&self) -> &str {
        // Construction guarantees ASCII digits.
        std::str::from_utf8(&self.0).expect("prefix bytes are ASCII digits")
    }
}

impl fmt::Display for BinPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for BinPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BinPrefix({})", self.as_str())
    }
}

impl FromStr for BinPrefix {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        Self::parse(raw)
    }
}

impl Serialize for BinPrefix {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A cached record together with its absolute expiry deadline.
///
/// Entries are owned exclusively by the tier map that holds them; the same
/// key in two tiers is two independent entries with independent deadlines.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The cached record, by value.
    pub record: BinRecord,
    /// Instant after which the entry no longer answers reads.
    pub expires_at: Instant,
}

impl CacheEntry {
    /// Creates an entry expiring `ttl` from now.
    pub fn new(record: BinRecord, ttl: Duration) -> Self {
        Self {
            record,
            expires_at: Instant::now() + ttl,
        }
    }

    /// Whether the entry still answers reads at `now`.
    pub fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }

    /// Whether the entry has passed its deadline at `now`.
    pub fn is_expired(&self, now: Instant) -> bool {
        !self.is_live(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_parse_plain_digits() {
        let prefix = BinPrefix::parse("411111").unwrap();
        assert_eq!(prefix.as_str(), "411111");
    }

    #[test]
    fn test_strip_non_digits() {
        let prefix = BinPrefix::parse(" 4111-11XX 22 ").unwrap();
        assert_eq!(prefix.as_str(), "411111");
    }

    #[test]
    fn test_full_pan_truncation() {
        let prefix = BinPrefix::parse("4111111111111111").unwrap();
        assert_eq!(prefix.as_str(), "411111");
    }

    #[test]
    fn test_normalization_equivalence() {
        let a = BinPrefix::parse("411111").unwrap();
        let b = BinPrefix::parse("4111-1111-2222-3333").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_input() {
        assert_matches!(
            BinPrefix::parse("   "),
            Err(Error::InvalidKey { reason, .. }) if reason == "BIN is required"
        );
    }

    #[test]
    fn test_too_short() {
        assert_matches!(
            BinPrefix::parse("41111"),
            Err(Error::InvalidKey { reason, .. }) if reason == "BIN must be at least 6 digits"
        );
        // Non-digit input with no digits at all counts as zero digits.
        assert_matches!(
            BinPrefix::parse("no-digits-here"),
            Err(Error::InvalidKey { reason, .. }) if reason == "BIN must be at least 6 digits"
        );
    }

    #[test]
    fn test_too_long() {
        let twenty = "4".repeat(20);
        assert_matches!(
            BinPrefix::parse(&twenty),
            Err(Error::InvalidKey { reason, .. }) if reason == "BIN too long"
        );
        // Nineteen digits is the longest valid PAN.
        assert!(BinPrefix::parse(&"4".repeat(19)).is_ok());
    }

    #[test]
    fn test_prefix_serialize() {
        let prefix = BinPrefix::parse("543210").unwrap();
        assert_eq!(serde_json::to_string(&prefix).unwrap(), "\"543210\"");
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expiry() {
        let entry = CacheEntry::new(BinRecord::unknown(), Duration::from_secs(60));
        assert!(entry.is_live(Instant::now()));

        tokio::time::advance(Duration::from_secs(59)).await;
        assert!(entry.is_live(Instant::now()));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(entry.is_expired(Instant::now()));
    }
}
