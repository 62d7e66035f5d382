use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use workwear_core::{DomainResult, GarmentType, Size, WorkerName};

use crate::entry::IssuanceEntry;

/// Selector value meaning "every worker".
pub const ALL_WORKERS: &str = "(all)";

/// Worker part of an issuance query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkerFilter {
    #[default]
    All,
    Only(WorkerName),
}

impl WorkerFilter {
    /// Absent, blank, or `(all)` selects every worker.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            None => WorkerFilter::All,
            Some(v) if v == ALL_WORKERS => WorkerFilter::All,
            Some(v) => match WorkerName::new(v) {
                Ok(worker) => WorkerFilter::Only(worker),
                Err(_) => WorkerFilter::All,
            },
        }
    }

    pub fn matches(&self, worker: &WorkerName) -> bool {
        match self {
            WorkerFilter::All => true,
            WorkerFilter::Only(w) => w == worker,
        }
    }
}

/// Issuance query: worker plus an inclusive calendar-date range.
///
/// Dates compare against the calendar date of each entry's timestamp, so a
/// `to` bound covers the whole day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuanceFilter {
    pub worker: WorkerFilter,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl IssuanceFilter {
    pub fn matches(&self, entry: &IssuanceEntry) -> bool {
        let date = entry.timestamp().date();
        self.worker.matches(entry.worker())
            && self.from.is_none_or(|from| date >= from)
            && self.to.is_none_or(|to| date <= to)
    }
}

/// Append-only log of completed checkouts, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssuanceLedger {
    entries: Vec<IssuanceEntry>,
}

impl IssuanceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = IssuanceEntry>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// All entries in insertion order.
    pub fn entries(&self) -> &[IssuanceEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append a checkout. Stock sufficiency is not re-checked here; callers
    /// record only after the stock debit succeeded.
    pub fn record_issuance(
        &mut self,
        timestamp: NaiveDateTime,
        worker: WorkerName,
        garment_type: GarmentType,
        size: Size,
        quantity: u32,
    ) -> DomainResult<&IssuanceEntry> {
        let entry = IssuanceEntry::new(timestamp, worker, garment_type, size, quantity)?;
        self.entries.push(entry);
        Ok(&self.entries[self.entries.len() - 1])
    }

    /// Workers that appear in the log (may repeat).
    pub fn workers(&self) -> impl Iterator<Item = &WorkerName> {
        self.entries.iter().map(IssuanceEntry::worker)
    }

    /// Garment types that appear in the log (may repeat).
    pub fn garment_types(&self) -> impl Iterator<Item = &GarmentType> {
        self.entries.iter().map(IssuanceEntry::garment_type)
    }

    /// Date of the oldest entry, the default lower bound for reports.
    pub fn earliest_date(&self) -> Option<NaiveDate> {
        self.entries.iter().map(|e| e.timestamp().date()).min()
    }

    /// Matching entries, newest first. Entries sharing a timestamp keep
    /// their insertion order.
    pub fn query(&self, filter: &IssuanceFilter) -> Vec<IssuanceEntry> {
        let mut matched: Vec<IssuanceEntry> = self
            .entries
            .iter()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));
        matched
    }
}
