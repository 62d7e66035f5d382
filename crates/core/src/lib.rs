//! `workwear-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no IO, no storage).

pub mod aggregate;
pub mod error;
pub mod name;

pub use aggregate::Aggregate;
pub use error::{DomainError, DomainResult, ensure_positive};
pub use name::{GarmentType, Size, WorkerName};
