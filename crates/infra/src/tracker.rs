//! Tracker: the coordinating workflow over stock, ledger and vocabulary.
//!
//! The tracker owns the whole in-memory state, loaded once from a
//! `TableStore`, and runs every operation as read-modify-write-persist:
//!
//! ```text
//! input
//!   ↓
//! 1. Validate names and quantities (typed domain values)
//!   ↓
//! 2. Decide + apply on the domain table (all-or-nothing)
//!   ↓
//! 3. Rewrite the affected table(s) before returning
//! ```
//!
//! A failed step 2 changes nothing. A failed step 3 is reported as
//! `TrackerError::Persistence`; the in-memory state then runs ahead of the
//! files until the next successful save of that table.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use thiserror::Error;

use workwear_core::{DomainError, GarmentType, Size, WorkerName};
use workwear_inventory::{InventoryStore, StockLine};
use workwear_issuance::{
    IssuanceEntry, IssuanceFilter, IssuanceLedger, IssuancePivot, WorkerTotal,
    pivot_by_worker_and_type, summarize_by_worker, worker_choices,
};
use workwear_vocabulary::VocabularyRegistry;

use crate::table::{TableError, TableStore};

#[derive(Debug, Error)]
pub enum TrackerError {
    /// Rejected by the domain rules; nothing changed.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Loading or saving a table failed.
    #[error("failed to {action} {table} table: {source}")]
    Persistence {
        action: &'static str,
        table: &'static str,
        #[source]
        source: TableError,
    },
}

impl TrackerError {
    fn save(table: &'static str, source: TableError) -> Self {
        Self::Persistence {
            action: "save",
            table,
            source,
        }
    }

    pub fn domain(&self) -> Option<&DomainError> {
        match self {
            TrackerError::Domain(e) => Some(e),
            TrackerError::Persistence { .. } => None,
        }
    }
}

pub type TrackerResult<T> = Result<T, TrackerError>;

/// Outcome of a successful checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueReceipt {
    pub entry: IssuanceEntry,
    /// Quantity left for the (type, size); 0 means the record is gone.
    pub remaining: u32,
}

/// Explicit process state for one data directory.
#[derive(Debug)]
pub struct Tracker<S: TableStore> {
    store: S,
    inventory: InventoryStore,
    ledger: IssuanceLedger,
    vocabulary: VocabularyRegistry,
    low_stock_threshold: u32,
}

impl<S: TableStore> Tracker<S> {
    /// Load all tables from `store`.
    pub fn open(store: S, low_stock_threshold: u32) -> TrackerResult<Self> {
        let tables = store.load().map_err(|source| TrackerError::Persistence {
            action: "load",
            table: "tracker",
            source,
        })?;

        if tables.migrated_placeholders {
            // Placeholder rows disappear on the next rewrite of their table.
            store
                .save_vocabulary(&tables.vocabulary)
                .map_err(|e| TrackerError::save("vocabulary", e))?;
            tracing::info!("migrated placeholder rows into the vocabulary table");
        }

        tracing::debug!(
            records = tables.inventory.len(),
            entries = tables.ledger.len(),
            low_stock_threshold,
            "tracker opened"
        );

        Ok(Self {
            store,
            inventory: tables.inventory,
            ledger: tables.ledger,
            vocabulary: tables.vocabulary,
            low_stock_threshold,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn inventory(&self) -> &InventoryStore {
        &self.inventory
    }

    pub fn ledger(&self) -> &IssuanceLedger {
        &self.ledger
    }

    pub fn vocabulary(&self) -> &VocabularyRegistry {
        &self.vocabulary
    }

    pub fn low_stock_threshold(&self) -> u32 {
        self.low_stock_threshold
    }

    /// Stock-in. Returns the quantity on hand afterwards.
    pub fn add_stock(&mut self, garment_type: &str, size: &str, quantity: u32) -> TrackerResult<u32> {
        let garment_type = GarmentType::new(garment_type)?;
        let size = Size::new(size)?;

        let on_hand = self
            .inventory
            .add_stock(garment_type.clone(), size.clone(), quantity)
            .inspect_err(|e| tracing::warn!(error = %e, "stock-in rejected"))?;

        self.persist_inventory()?;
        tracing::info!(%garment_type, %size, quantity, on_hand, "stock added");
        Ok(on_hand)
    }

    /// Checkout: debit the stock and append to the ledger, then save both
    /// tables.
    ///
    /// The ledger only ever sees debits that succeeded, and every debit gets
    /// its entry in memory even when a save fails.
    pub fn issue(
        &mut self,
        worker: &str,
        garment_type: &str,
        size: &str,
        quantity: u32,
        occurred_at: NaiveDateTime,
    ) -> TrackerResult<IssueReceipt> {
        let worker = WorkerName::new(worker)?;
        let garment_type = GarmentType::new(garment_type)?;
        let size = Size::new(size)?;

        let remaining = self
            .inventory
            .issue_stock(garment_type.clone(), size.clone(), quantity)
            .inspect_err(|e| tracing::warn!(%worker, error = %e, "issue rejected"))?;
        // Quantity was validated by the debit, so the append cannot fail.
        let entry = self
            .ledger
            .record_issuance(occurred_at, worker, garment_type, size, quantity)?
            .clone();

        // Attempt both saves so one failing table does not hold back the other.
        let inventory_saved = self.persist_inventory();
        let issuance_saved = self.persist_issuance();
        inventory_saved.and(issuance_saved)?;

        tracing::info!(
            worker = %entry.worker(),
            garment_type = %entry.garment_type(),
            size = %entry.size(),
            quantity,
            remaining,
            "stock issued"
        );
        Ok(IssueReceipt { entry, remaining })
    }

    /// Make a type selectable without stocking it.
    pub fn register_type(&mut self, name: &str) -> TrackerResult<GarmentType> {
        let name = GarmentType::new(name)?;
        let derived = self.inventory.stocked_types().chain(self.ledger.garment_types());
        self.vocabulary
            .register_type(name.clone(), derived)
            .inspect_err(|e| tracing::warn!(error = %e, "type registration rejected"))?;

        self.persist_vocabulary()?;
        tracing::info!(garment_type = %name, "type registered");
        Ok(name)
    }

    /// Make a worker selectable before anything is issued to them.
    pub fn register_worker(&mut self, name: &str) -> TrackerResult<WorkerName> {
        let name = WorkerName::new(name)?;
        self.vocabulary
            .register_worker(name.clone(), self.ledger.workers())
            .inspect_err(|e| tracing::warn!(error = %e, "worker registration rejected"))?;

        self.persist_vocabulary()?;
        tracing::info!(worker = %name, "worker registered");
        Ok(name)
    }

    /// Every selectable type: stocked, issued before, or registered.
    pub fn known_types(&self) -> Vec<GarmentType> {
        let derived = self.inventory.stocked_types().chain(self.ledger.garment_types());
        self.vocabulary.known_types(derived)
    }

    /// Every selectable worker: issued to before, or registered.
    pub fn known_workers(&self) -> Vec<WorkerName> {
        self.vocabulary.known_workers(self.ledger.workers())
    }

    /// Sizes currently in stock for a type.
    pub fn list_sizes(&self, garment_type: &str) -> TrackerResult<Vec<Size>> {
        let garment_type = GarmentType::new(garment_type)?;
        Ok(self.inventory.list_sizes(&garment_type))
    }

    /// Stock listing with the low-stock flag applied.
    pub fn stock_lines(&self) -> Vec<StockLine> {
        self.inventory.stock_lines(self.low_stock_threshold)
    }

    /// Filtered issuance listing, newest first.
    pub fn query(&self, filter: &IssuanceFilter) -> Vec<IssuanceEntry> {
        self.ledger.query(filter)
    }

    pub fn summarize(&self, filter: &IssuanceFilter) -> Vec<WorkerTotal> {
        summarize_by_worker(&self.ledger.query(filter))
    }

    pub fn pivot(&self, filter: &IssuanceFilter) -> IssuancePivot {
        pivot_by_worker_and_type(&self.ledger.query(filter))
    }

    /// Worker selector for reports: `(all)` then every worker in the log.
    pub fn report_worker_choices(&self) -> Vec<String> {
        worker_choices(self.ledger.entries())
    }

    /// Fill in the report date defaults: from the oldest entry to `today`.
    pub fn default_bounds(&self, mut filter: IssuanceFilter, today: NaiveDate) -> IssuanceFilter {
        if filter.from.is_none() {
            filter.from = self.ledger.earliest_date();
        }
        if filter.to.is_none() {
            filter.to = Some(today);
        }
        filter
    }

    fn persist_inventory(&self) -> TrackerResult<()> {
        self.store
            .save_inventory(&self.inventory)
            .inspect_err(|e| tracing::error!(error = %e, "failed to save inventory table"))
            .map_err(|e| TrackerError::save("inventory", e))
    }

    fn persist_issuance(&self) -> TrackerResult<()> {
        self.store
            .save_issuance(&self.ledger)
            .inspect_err(|e| tracing::error!(error = %e, "failed to save issuance table"))
            .map_err(|e| TrackerError::save("issuance", e))
    }

    fn persist_vocabulary(&self) -> TrackerResult<()> {
        self.store
            .save_vocabulary(&self.vocabulary)
            .inspect_err(|e| tracing::error!(error = %e, "failed to save vocabulary table"))
            .map_err(|e| TrackerError::save("vocabulary", e))
    }
}
