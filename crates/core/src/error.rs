//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every variant describes a rejected operation that left state untouched.
/// Storage failures are not domain errors; they live in the infra crate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// An input failed validation (empty name, zero quantity, ...).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An issue was requested for a (type, size) pair with no stock record.
    #[error("no such item in stock: {garment_type} ({size})")]
    NoSuchItem { garment_type: String, size: String },

    /// An issue asked for more than the record holds.
    #[error("insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: u32, available: u32 },

    /// A type or worker name is already known.
    #[error("already registered: {0}")]
    DuplicateRegistration(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn no_such_item(garment_type: impl Into<String>, size: impl Into<String>) -> Self {
        Self::NoSuchItem {
            garment_type: garment_type.into(),
            size: size.into(),
        }
    }

    pub fn insufficient_stock(requested: u32, available: u32) -> Self {
        Self::InsufficientStock {
            requested,
            available,
        }
    }

    pub fn duplicate(what: impl Into<String>) -> Self {
        Self::DuplicateRegistration(what.into())
    }
}

/// Reject a zero quantity; every stock movement moves at least one piece.
pub fn ensure_positive(quantity: u32, field: &str) -> DomainResult<u32> {
    if quantity == 0 {
        return Err(DomainError::validation(format!("{field} must be at least 1")));
    }
    Ok(quantity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_quantity_is_a_validation_error() {
        let err = ensure_positive(0, "quantity").unwrap_err();
        assert_eq!(err, DomainError::validation("quantity must be at least 1"));
        assert_eq!(ensure_positive(3, "quantity"), Ok(3));
    }

    #[test]
    fn messages_name_the_item() {
        let err = DomainError::no_such_item("Boots", "42");
        assert_eq!(err.to_string(), "no such item in stock: Boots (42)");

        let err = DomainError::insufficient_stock(5, 3);
        assert_eq!(err.to_string(), "insufficient stock: requested 5, available 3");
    }
}
