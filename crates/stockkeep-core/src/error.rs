//! # Error Types
//!
//! Domain-specific error types for stockkeep-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  stockkeep-core errors (this file)                                     │
//! │  ├── CoreError        - Ledger rule violations                         │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  stockkeep-db errors (separate crate)                                  │
//! │  └── DbError          - Store failures                                 │
//! │                                                                         │
//! │  stockkeep-engine errors                                               │
//! │  └── EngineError      - What callers see (kind + message)              │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError ─┬─► EngineError → UI               │
//! │                          DbError ───┘                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Ledger rule violations detected while an operation runs.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A referenced entity is missing at transaction time.
    ///
    /// ## When This Occurs
    /// - Client / seller / product of a new sale was deleted meanwhile
    /// - Sale or shipment id no longer exists
    /// - Seller name given to an amendment matches nobody
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A sale line asks for more units than the product has on hand.
    ///
    /// ## User Workflow
    /// ```text
    /// create_sale([(P1, 5), (P2, 1000)])
    ///      │
    ///      ▼
    /// P2 stock check: available=10
    ///      │
    ///      ▼
    /// InsufficientStock { product_id: P2, available: 10, requested: 1000 }
    ///      │
    ///      ▼
    /// Whole transaction rolled back (P1 untouched)
    /// ```
    #[error("Insufficient stock for product {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: i64,
        available: i64,
        requested: i64,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a NotFound error for a given entity kind and id.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        CoreError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These are raised before any transaction is opened.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must be zero or more.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (non-numeric quantity, bad date, ...).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Line quantity exceeds [`crate::MAX_QUANTITY`].
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// An amount, or a total computed from validated amounts, does not fit.
    #[error("{field} is too large")]
    TooLarge { field: String },

    /// A list had too few or too many entries.
    #[error("{field} must contain between {min} and {max} entries")]
    Count { field: String, min: usize, max: usize },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            product_id: 2,
            available: 10,
            requested: 1000,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for product 2: available 10, requested 1000"
        );

        let err = CoreError::not_found("Sale", 42);
        assert_eq!(err.to_string(), "Sale not found: 42");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "deliveryman".to_string(),
        };
        assert_eq!(validation_err.to_string(), "deliveryman is required");

        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
