//! Batch resolution with bounded concurrency.
//!
//! A batch is processed in fixed windows of `max_concurrent` inputs. The
//! window's resolutions run concurrently and the whole window completes
//! before the next one starts, which caps in-flight work without any
//! shared queue. Each input carries its own timeout and gets its own slot
//! in the output, in input order.

use crate::error::{Error, Result};
use crate::service::lookup::{LookupService, Resolution};
use futures::future::join_all;
use std::time::Duration;
use tracing::debug;

/// Concurrency and timeout settings for one batch call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOptions {
    /// Inputs resolved concurrently per window. Zero behaves as one.
    pub max_concurrent: usize,
    /// Budget for each individual resolution.
    pub per_item_timeout: Duration,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            max_concurrent: 10,
            per_item_timeout: Duration::from_secs(30),
        }
    }
}

impl LookupService {
    /// Resolves many raw inputs, bounded by `options.max_concurrent`.
    ///
    /// Outcomes line up with inputs by position. An input that fails
    /// validation, times out or errors occupies its own slot and never
    /// disturbs the rest of the batch.
    pub async fn resolve_batch(
        &self,
        inputs: &[String],
        options: &BatchOptions,
    ) -> Vec<Result<Resolution>> {
        let window_size = options.max_concurrent.max(1);
        let mut outcomes = Vec::with_capacity(inputs.len());

        for window in inputs.chunks(window_size) {
            let resolutions = window.iter().map(|raw| async move {
                match tokio::time::timeout(options.per_item_timeout, self.resolve(raw)).await {
                    Ok(outcome) => outcome,
                    Err(_) => Err(Error::Timeout {
                        input: raw.clone(),
                        limit: options.per_item_timeout,
                    }),
                }
            });
            outcomes.extend(join_all(resolutions).await);
        }

        debug!(
            total = inputs.len(),
            failed = outcomes.iter().filter(|outcome| outcome.is_err()).count(),
            "batch resolved"
        );
        outcomes
    }
}
