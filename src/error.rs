//! Error types for BIN resolution.
//!
//! Dataset failures (`Io`, `JsonParse`, `DatasetLoad`) only ever surface
//! from a dataset source directly; the loader absorbs them into degraded
//! mode, so lookups themselves fail only for caller mistakes or timeouts.

use std::time::Duration;
use thiserror::Error;

/// Unified error type for the lookup service
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Input Errors
    // =========================================================================
    #[error("Invalid BIN {input:?}: {reason}")]
    InvalidKey { input: String, reason: String },

    // =========================================================================
    // Batch Errors
    // =========================================================================
    #[error("Timed out after {}ms resolving {input:?}", limit.as_millis())]
    Timeout { input: String, limit: Duration },

    // =========================================================================
    // Dataset Errors
    // =========================================================================
    #[error("Dataset load failed: {0}")]
    DatasetLoad(String),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl Error {
    pub fn invalid_key(input: &str, reason: &str) -> Self {
        Self::InvalidKey {
            input: input.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Check if the caller sent something unusable, as opposed to the
    /// service failing
    pub fn is_caller_error(&self) -> bool {
        matches!(self, Self::InvalidKey { .. })
    }

    /// Check if a batch item ran out of time
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Check if the loader absorbs this failure into degraded mode
    /// instead of surfacing it per lookup
    pub fn is_degradable(&self) -> bool {
        matches!(
            self,
            Self::DatasetLoad(_) | Self::Io(_) | Self::JsonParse(_)
        )
    }
}

/// Result type alias for the lookup service
pub type Result<T> = std::result::Result<T, Error>;
