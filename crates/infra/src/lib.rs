//! Infrastructure layer: table storage, configuration, and the tracker
//! workflow that ties the domain crates to durable storage.

pub mod config;
pub mod table;
pub mod tracker;


pub use config::{ConfigError, DEFAULT_LOW_STOCK_THRESHOLD, TrackerConfig};
pub use table::{CsvTableStore, InMemoryTableStore, TableError, TableStore, Tables};
pub use tracker::{IssueReceipt, Tracker, TrackerError, TrackerResult};
