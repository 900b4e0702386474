//! BIN record schema.

use serde::{Deserialize, Serialize};

/// Placeholder value for attributes the dataset does not know.
pub const UNKNOWN: &str = "Unknown";

fn unknown_string() -> String {
    UNKNOWN.to_string()
}

/// Issuer attributes for one BIN prefix.
///
/// Field names follow the dataset's JSON schema (camelCase). All fields are
/// free-form categorical strings; attributes missing from a dataset entry
/// deserialize to [`UNKNOWN`], except the country code which defaults to
/// empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinRecord {
    /// Scheme, e.g. "Visa" or "Mastercard".
    #[serde(default = "unknown_string")]
    pub card_type: String,
    /// Product within the scheme, e.g. "Classic" or "Platinum".
    #[serde(default = "unknown_string")]
    pub card_sub_type: String,
    /// Debit, credit or prepaid.
    #[serde(default = "unknown_string")]
    pub card_category: String,
    /// Consumer or commercial.
    #[serde(default = "unknown_string")]
    pub bin_category: String,
    /// Whether the issuer is rate-regulated.
    #[serde(default = "unknown_string")]
    pub card_regulated: String,
    /// Issuing bank name.
    #[serde(default = "unknown_string")]
    pub issuing_bank: String,
    /// ISO country code of the issuer, empty when unknown.
    #[serde(default)]
    pub issuing_country_code: String,
}

impl BinRecord {
    /// The sentinel record cached for prefixes absent from the dataset.
    ///
    /// Caching the sentinel with normal TTLs keeps repeated lookups of
    /// unknown prefixes from hitting the dataset again.
    pub fn unknown() -> Self {
        Self {
            card_type: unknown_string(),
            card_sub_type: unknown_string(),
            card_category: unknown_string(),
            bin_category: unknown_string(),
            card_regulated: unknown_string(),
            issuing_bank: unknown_string(),
            issuing_country_code: String::new(),
        }
    }

    /// Whether this is the sentinel for an unmatched prefix.
    pub fn is_unknown(&self) -> bool {
        self == &Self::unknown()
    }
}

impl Default for BinRecord {
    fn default() -> Self {
        Self::unknown()
    }
}
