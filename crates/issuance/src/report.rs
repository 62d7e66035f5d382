//! Aggregations over issuance entries.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use workwear_core::{GarmentType, WorkerName};

use crate::entry::IssuanceEntry;
use crate::ledger::ALL_WORKERS;

/// Total pieces issued to one worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerTotal {
    pub worker: WorkerName,
    pub total: u64,
}

/// One worker's row of the pivot: a quantity per pivot column plus the sum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PivotRow {
    pub worker: WorkerName,
    /// Aligned with `IssuancePivot::types`; absent combinations are 0.
    pub quantities: Vec<u64>,
    pub total: u64,
}

/// Quantity issued per (worker, type).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuancePivot {
    /// Column headers: distinct types in the entry set, sorted.
    pub types: Vec<GarmentType>,
    /// One row per worker, sorted by worker.
    pub rows: Vec<PivotRow>,
}

impl IssuancePivot {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell lookup. `None` if the worker or type is not part of the pivot.
    pub fn get(&self, worker: &str, garment_type: &str) -> Option<u64> {
        let column = self.types.iter().position(|t| t.as_str() == garment_type)?;
        let row = self.rows.iter().find(|r| r.worker.as_str() == worker)?;
        row.quantities.get(column).copied()
    }
}

/// Sum of issued quantity per worker, sorted by worker.
pub fn summarize_by_worker<'a>(
    entries: impl IntoIterator<Item = &'a IssuanceEntry>,
) -> Vec<WorkerTotal> {
    let mut totals: BTreeMap<&WorkerName, u64> = BTreeMap::new();
    for entry in entries {
        *totals.entry(entry.worker()).or_insert(0) += u64::from(entry.quantity());
    }
    totals
        .into_iter()
        .map(|(worker, total)| WorkerTotal {
            worker: worker.clone(),
            total,
        })
        .collect()
}

/// Worker × type pivot, zero-filled, with a per-worker total.
pub fn pivot_by_worker_and_type<'a>(
    entries: impl IntoIterator<Item = &'a IssuanceEntry>,
) -> IssuancePivot {
    let mut cells: BTreeMap<&WorkerName, BTreeMap<&GarmentType, u64>> = BTreeMap::new();
    let mut types: BTreeSet<&GarmentType> = BTreeSet::new();

    for entry in entries {
        types.insert(entry.garment_type());
        *cells
            .entry(entry.worker())
            .or_default()
            .entry(entry.garment_type())
            .or_insert(0) += u64::from(entry.quantity());
    }

    let rows = cells
        .into_iter()
        .map(|(worker, by_type)| {
            let quantities: Vec<u64> = types
                .iter()
                .map(|t| by_type.get(t).copied().unwrap_or(0))
                .collect();
            PivotRow {
                worker: worker.clone(),
                total: quantities.iter().sum(),
                quantities,
            }
        })
        .collect();

    IssuancePivot {
        types: types.into_iter().cloned().collect(),
        rows,
    }
}

/// Choices for the report worker selector: `(all)` then the distinct
/// workers of the entry set, sorted.
pub fn worker_choices<'a>(entries: impl IntoIterator<Item = &'a IssuanceEntry>) -> Vec<String> {
    let workers: BTreeSet<&str> = entries.into_iter().map(|e| e.worker().as_str()).collect();
    std::iter::once(ALL_WORKERS)
        .chain(workers)
        .map(str::to_string)
        .collect()
}
