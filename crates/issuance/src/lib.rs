//! Issuance domain module.
//!
//! The ledger is an append-only record of completed checkouts. Entries are
//! facts: they are never edited or removed. Reports are pure functions over a
//! slice of entries, usually the result of a filtered query.

pub mod entry;
pub mod ledger;
pub mod report;

pub use entry::{IssuanceEntry, TIMESTAMP_FORMAT};
pub use ledger::{ALL_WORKERS, IssuanceFilter, IssuanceLedger, WorkerFilter};
pub use report::{
    IssuancePivot, PivotRow, WorkerTotal, pivot_by_worker_and_type, summarize_by_worker,
    worker_choices,
};
