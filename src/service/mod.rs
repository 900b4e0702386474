//! Resolution services layered on the cache: single lookups and batches.

pub mod batch;
pub mod lookup;

pub use batch::BatchOptions;
pub use lookup::{LookupService, LookupServiceConfig, Resolution, ResolutionSource};
