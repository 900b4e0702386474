//! The backing BIN dataset: record schema, sources and the lazy loader.

pub mod loader;
pub mod record;
pub mod source;

pub use loader::{DatasetInfo, DatasetLoader};
pub use record::{BinRecord, UNKNOWN};
pub use source::{BinDataset, DatasetSource, JsonFileSource, StaticSource};
