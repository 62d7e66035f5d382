use chrono::{NaiveDateTime, SubsecRound};
use serde::Serialize;

use workwear_core::{DomainResult, GarmentType, Size, WorkerName, ensure_positive};

/// Wall-clock format used for issuance timestamps in tables and reports.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One completed checkout (immutable).
///
/// Only built through `new`, so every entry has a positive quantity and a
/// timestamp in whole seconds, the precision the tables store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuanceEntry {
    timestamp: NaiveDateTime,
    worker: WorkerName,
    garment_type: GarmentType,
    size: Size,
    quantity: u32,
}

impl IssuanceEntry {
    pub fn new(
        timestamp: NaiveDateTime,
        worker: WorkerName,
        garment_type: GarmentType,
        size: Size,
        quantity: u32,
    ) -> DomainResult<Self> {
        ensure_positive(quantity, "quantity")?;
        Ok(Self {
            timestamp: timestamp.trunc_subsecs(0),
            worker,
            garment_type,
            size,
            quantity,
        })
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    pub fn worker(&self) -> &WorkerName {
        &self.worker
    }

    pub fn garment_type(&self) -> &GarmentType {
        &self.garment_type
    }

    pub fn size(&self) -> &Size {
        &self.size
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Timestamp rendered as `YYYY-MM-DD HH:MM:SS`.
    pub fn formatted_timestamp(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }
}
