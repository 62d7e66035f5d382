//! CSV row formats for the persisted tables and the exported reports.
//!
//! Inventory: `Type,Size,Quantity`. Issuance: `Date,Worker,Type,Size,Quantity`.
//! Vocabulary: `Kind,Name`. Headers from the older Hungarian-language files
//! are accepted on read; writes always use the English headers.

use std::io::{Read, Write};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use workwear_core::{GarmentType, Size, WorkerName};
use workwear_inventory::{StockLine, StockRecord};
use workwear_issuance::{IssuanceEntry, IssuancePivot, TIMESTAMP_FORMAT, WorkerTotal};
use workwear_vocabulary::{VocabularyKind, VocabularyRegistry};

use super::TableError;

pub const INVENTORY_HEADERS: [&str; 3] = ["Type", "Size", "Quantity"];
pub const ISSUANCE_HEADERS: [&str; 5] = ["Date", "Worker", "Type", "Size", "Quantity"];
pub const VOCABULARY_HEADERS: [&str; 2] = ["Kind", "Name"];
pub const STOCK_REPORT_HEADERS: [&str; 4] = ["Type", "Size", "Quantity", "Low Stock"];
pub const SUMMARY_HEADERS: [&str; 2] = ["Worker", "Total Issued"];

#[derive(Debug, Deserialize)]
struct RawInventoryRow {
    #[serde(rename = "Type", alias = "Típus")]
    garment_type: String,
    #[serde(rename = "Size", alias = "Méret")]
    size: String,
    #[serde(rename = "Quantity", alias = "Mennyiség")]
    quantity: String,
}

#[derive(Debug, Deserialize)]
struct RawIssuanceRow {
    #[serde(rename = "Date", alias = "Dátum")]
    date: String,
    #[serde(rename = "Worker", alias = "Dolgozó")]
    worker: String,
    #[serde(rename = "Type", alias = "Típus")]
    garment_type: String,
    #[serde(rename = "Size", alias = "Méret")]
    size: String,
    #[serde(rename = "Quantity", alias = "Mennyiség")]
    quantity: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct VocabularyRow {
    #[serde(rename = "Kind")]
    kind: VocabularyKind,
    #[serde(rename = "Name")]
    name: String,
}

#[derive(Debug, Serialize)]
struct InventoryRow<'a> {
    garment_type: &'a str,
    size: &'a str,
    quantity: u32,
}

#[derive(Debug, Serialize)]
struct IssuanceRow<'a> {
    date: String,
    worker: &'a str,
    garment_type: &'a str,
    size: &'a str,
    quantity: u32,
}

#[derive(Debug, Serialize)]
struct StockReportRow<'a> {
    garment_type: &'a str,
    size: &'a str,
    quantity: u32,
    low_stock: &'static str,
}

/// Stock rows plus type names registered through placeholder rows.
#[derive(Debug, Default)]
pub struct InventoryTable {
    pub records: Vec<StockRecord>,
    pub placeholder_types: Vec<GarmentType>,
}

/// Issuance entries plus worker names registered through placeholder rows.
#[derive(Debug, Default)]
pub struct IssuanceTable {
    pub entries: Vec<IssuanceEntry>,
    pub placeholder_workers: Vec<WorkerName>,
}

/// Parse a quantity cell. Whole-number floats ("3.0") are accepted because
/// older files were written by a tool that widened integer columns.
pub fn parse_quantity(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    if let Ok(q) = raw.parse::<u32>() {
        return Some(q);
    }
    let f = raw.parse::<f64>().ok()?;
    if f.fract() == 0.0 && f >= 0.0 && f <= f64::from(u32::MAX) {
        return Some(f as u32);
    }
    None
}

fn invalid(path: &str, row: usize, reason: impl Into<String>) -> TableError {
    TableError::InvalidRow {
        path: path.to_string(),
        row,
        reason: reason.into(),
    }
}

fn csv_error(path: &str, source: csv::Error) -> TableError {
    TableError::Csv {
        path: path.to_string(),
        source,
    }
}

fn quantity_cell(path: &str, row: usize, raw: &str) -> Result<u32, TableError> {
    parse_quantity(raw).ok_or_else(|| invalid(path, row, format!("bad quantity {raw:?}")))
}

/// Read the stock table.
///
/// A row with an empty size and quantity 0 is a type placeholder; any other
/// row with quantity 0 carries no stock and is dropped.
pub fn read_inventory<R: Read>(reader: R, path: &str) -> Result<InventoryTable, TableError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut table = InventoryTable::default();

    for (index, result) in rdr.deserialize::<RawInventoryRow>().enumerate() {
        let row = index + 1;
        let raw = result.map_err(|e| csv_error(path, e))?;
        let quantity = quantity_cell(path, row, &raw.quantity)?;
        let garment_type =
            GarmentType::new(raw.garment_type).map_err(|e| invalid(path, row, e.to_string()))?;

        if raw.size.trim().is_empty() {
            if quantity != 0 {
                return Err(invalid(path, row, "size cannot be empty"));
            }
            table.placeholder_types.push(garment_type);
            continue;
        }
        if quantity == 0 {
            continue;
        }

        let size = Size::new(raw.size).map_err(|e| invalid(path, row, e.to_string()))?;
        table.records.push(StockRecord {
            garment_type,
            size,
            quantity,
        });
    }

    Ok(table)
}

/// Read the issuance table.
///
/// A row with only a worker name (empty date, type and size, quantity 0) is
/// a worker placeholder and does not become a ledger entry.
pub fn read_issuance<R: Read>(reader: R, path: &str) -> Result<IssuanceTable, TableError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut table = IssuanceTable::default();

    for (index, result) in rdr.deserialize::<RawIssuanceRow>().enumerate() {
        let row = index + 1;
        let raw = result.map_err(|e| csv_error(path, e))?;
        let quantity = quantity_cell(path, row, &raw.quantity)?;
        let worker = WorkerName::new(raw.worker).map_err(|e| invalid(path, row, e.to_string()))?;

        let is_placeholder = raw.date.trim().is_empty()
            && raw.garment_type.trim().is_empty()
            && raw.size.trim().is_empty()
            && quantity == 0;
        if is_placeholder {
            table.placeholder_workers.push(worker);
            continue;
        }

        let timestamp = NaiveDateTime::parse_from_str(raw.date.trim(), TIMESTAMP_FORMAT)
            .map_err(|e| invalid(path, row, format!("bad date {:?}: {e}", raw.date)))?;
        let garment_type =
            GarmentType::new(raw.garment_type).map_err(|e| invalid(path, row, e.to_string()))?;
        let size = Size::new(raw.size).map_err(|e| invalid(path, row, e.to_string()))?;
        let entry = IssuanceEntry::new(timestamp, worker, garment_type, size, quantity)
            .map_err(|e| invalid(path, row, e.to_string()))?;
        table.entries.push(entry);
    }

    Ok(table)
}

/// Read the vocabulary table.
pub fn read_vocabulary<R: Read>(reader: R, path: &str) -> Result<VocabularyRegistry, TableError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut types = Vec::new();
    let mut workers = Vec::new();

    for (index, result) in rdr.deserialize::<VocabularyRow>().enumerate() {
        let row = index + 1;
        let raw = result.map_err(|e| csv_error(path, e))?;
        match raw.kind {
            VocabularyKind::Type => types.push(
                GarmentType::new(raw.name).map_err(|e| invalid(path, row, e.to_string()))?,
            ),
            VocabularyKind::Worker => workers.push(
                WorkerName::new(raw.name).map_err(|e| invalid(path, row, e.to_string()))?,
            ),
        }
    }

    Ok(VocabularyRegistry::from_parts(types, workers))
}

fn headerless<W: Write>(writer: W, headers: &[&str]) -> csv::Result<csv::Writer<W>> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    // Written by hand so an empty table still carries its header.
    wtr.write_record(headers)?;
    Ok(wtr)
}

pub fn write_inventory<W: Write>(writer: W, records: &[StockRecord]) -> csv::Result<()> {
    let mut wtr = headerless(writer, &INVENTORY_HEADERS)?;
    for record in records {
        wtr.serialize(InventoryRow {
            garment_type: record.garment_type.as_str(),
            size: record.size.as_str(),
            quantity: record.quantity,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_issuance<'a, W: Write>(
    writer: W,
    entries: impl IntoIterator<Item = &'a IssuanceEntry>,
) -> csv::Result<()> {
    let mut wtr = headerless(writer, &ISSUANCE_HEADERS)?;
    for entry in entries {
        wtr.serialize(IssuanceRow {
            date: entry.formatted_timestamp(),
            worker: entry.worker().as_str(),
            garment_type: entry.garment_type().as_str(),
            size: entry.size().as_str(),
            quantity: entry.quantity(),
        })?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_vocabulary<W: Write>(writer: W, vocabulary: &VocabularyRegistry) -> csv::Result<()> {
    let mut wtr = headerless(writer, &VOCABULARY_HEADERS)?;
    let types = vocabulary
        .registered_types()
        .map(|t| (VocabularyKind::Type, t.as_str()));
    let workers = vocabulary
        .registered_workers()
        .map(|w| (VocabularyKind::Worker, w.as_str()));
    for (kind, name) in types.chain(workers) {
        wtr.serialize(VocabularyRow {
            kind,
            name: name.to_string(),
        })?;
    }
    wtr.flush()?;
    Ok(())
}

/// Stock listing export: the stock table plus a `Low Stock` column.
pub fn write_stock_report<W: Write>(writer: W, lines: &[StockLine]) -> csv::Result<()> {
    let mut wtr = headerless(writer, &STOCK_REPORT_HEADERS)?;
    for line in lines {
        wtr.serialize(StockReportRow {
            garment_type: line.record.garment_type.as_str(),
            size: line.record.size.as_str(),
            quantity: line.record.quantity,
            low_stock: if line.low_stock { "yes" } else { "no" },
        })?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_summary<W: Write>(writer: W, totals: &[WorkerTotal]) -> csv::Result<()> {
    let mut wtr = headerless(writer, &SUMMARY_HEADERS)?;
    for total in totals {
        wtr.write_record([total.worker.as_str(), total.total.to_string().as_str()])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Pivot export: `Worker`, one column per type, `Total`.
pub fn write_pivot<W: Write>(writer: W, pivot: &IssuancePivot) -> csv::Result<()> {
    let mut headers: Vec<&str> = vec!["Worker"];
    headers.extend(pivot.types.iter().map(GarmentType::as_str));
    headers.push("Total");

    let mut wtr = headerless(writer, &headers)?;
    for row in &pivot.rows {
        let mut record: Vec<String> = Vec::with_capacity(row.quantities.len() + 2);
        record.push(row.worker.to_string());
        record.extend(row.quantities.iter().map(u64::to_string));
        record.push(row.total.to_string());
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}
