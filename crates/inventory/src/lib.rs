//! Inventory domain module.
//!
//! This crate contains the stock rules for workwear items, implemented purely
//! as deterministic domain logic (no IO, no storage).

pub mod stock;

pub use stock::{
    AddStock, InventoryStore, IssueStock, StockAdded, StockCommand, StockEvent, StockIssued,
    StockKey, StockLine, StockRecord,
};
