//! Durable table storage for the tracker state.
//!
//! The tracker keeps its state in memory and rewrites a whole table after
//! every mutation. A `TableStore` loads the three tables once at startup and
//! saves them one at a time afterwards.

pub mod csv_store;
pub mod in_memory;
pub mod rows;

pub use csv_store::CsvTableStore;
pub use in_memory::InMemoryTableStore;

use std::sync::Arc;

use thiserror::Error;

use workwear_inventory::InventoryStore;
use workwear_issuance::IssuanceLedger;
use workwear_vocabulary::VocabularyRegistry;

/// Everything read from durable storage at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tables {
    pub inventory: InventoryStore,
    pub ledger: IssuanceLedger,
    pub vocabulary: VocabularyRegistry,
    /// Placeholder rows from older files were moved into `vocabulary`; the
    /// vocabulary table must be written so they survive the next rewrite.
    pub migrated_placeholders: bool,
}

#[derive(Debug, Error)]
pub enum TableError {
    #[error("io error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("csv error in {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("invalid row {row} in {path}: {reason}")]
    InvalidRow {
        path: String,
        row: usize,
        reason: String,
    },

    #[error("table store unavailable: {0}")]
    Unavailable(String),
}

/// Table store abstraction.
pub trait TableStore: Send + Sync {
    /// Read all tables. Missing tables load as empty.
    fn load(&self) -> Result<Tables, TableError>;

    /// Rewrite the stock table.
    fn save_inventory(&self, inventory: &InventoryStore) -> Result<(), TableError>;

    /// Rewrite the issuance table.
    fn save_issuance(&self, ledger: &IssuanceLedger) -> Result<(), TableError>;

    /// Rewrite the vocabulary table.
    fn save_vocabulary(&self, vocabulary: &VocabularyRegistry) -> Result<(), TableError>;
}

impl<S> TableStore for Arc<S>
where
    S: TableStore + ?Sized,
{
    fn load(&self) -> Result<Tables, TableError> {
        (**self).load()
    }

    fn save_inventory(&self, inventory: &InventoryStore) -> Result<(), TableError> {
        (**self).save_inventory(inventory)
    }

    fn save_issuance(&self, ledger: &IssuanceLedger) -> Result<(), TableError> {
        (**self).save_issuance(ledger)
    }

    fn save_vocabulary(&self, vocabulary: &VocabularyRegistry) -> Result<(), TableError> {
        (**self).save_vocabulary(vocabulary)
    }
}
