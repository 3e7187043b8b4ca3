//! # Engine Error Type
//!
//! The single error type every engine operation returns.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Stockkeep                              │
//! │                                                                         │
//! │  UI collaborator             Engine                                     │
//! │  ───────────────             ──────                                     │
//! │                                                                         │
//! │  engine.sales().create_sale(..)                                        │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Operation                                                       │  │
//! │  │  Result<T, EngineError>                                          │  │
//! │  │         │                                                        │  │
//! │  │  ValidationError ───────────────────────────► kind: VALIDATION   │  │
//! │  │  CoreError::InsufficientStock ──────────────► INSUFFICIENT_STOCK │  │
//! │  │  CoreError::NotFound / DbError::NotFound ───► NOT_FOUND          │  │
//! │  │  DbError (constraint, busy, I/O) ───────────► STORE              │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  match err.kind { InsufficientStock => highlight err.product_id, .. }  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Serialization
//! ```json
//! { "kind": "INSUFFICIENT_STOCK", "message": "...", "productId": 2 }
//! ```

use serde::Serialize;
use stockkeep_core::{CoreError, ProductId, ValidationError};
use stockkeep_db::DbError;

/// Convenience alias for engine results.
pub type EngineResult<T> = Result<T, EngineError>;

/// Error returned by every engine operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineError {
    /// Machine-readable category.
    pub kind: ErrorKind,

    /// Human-readable message for display.
    pub message: String,

    /// The product whose stock was short (InsufficientStock only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<ProductId>,
}

/// Error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Empty, negative or malformed input. Raised before any transaction.
    Validation,

    /// A sale line asked for more units than are on hand.
    InsufficientStock,

    /// A referenced client, product, seller, sale or shipment is missing.
    NotFound,

    /// The store failed: constraint, lock timeout, connection, I/O.
    Store,
}

impl EngineError {
    /// Creates a new engine error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        EngineError {
            kind,
            message: message.into(),
            product_id: None,
        }
    }

    /// Creates a not found error.
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        EngineError::new(ErrorKind::NotFound, format!("{} not found: {}", entity, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        EngineError::new(ErrorKind::Validation, message)
    }

    /// Creates a store error.
    pub fn store(message: impl Into<String>) -> Self {
        EngineError::new(ErrorKind::Store, message)
    }

    pub fn is_insufficient_stock(&self) -> bool {
        self.kind == ErrorKind::InsufficientStock
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::NotFound
    }
}

/// Converts store errors to engine errors.
impl From<DbError> for EngineError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => EngineError::not_found(&entity, id),
            DbError::UniqueViolation { field, value } => {
                EngineError::validation(format!("{} '{}' already exists", field, value))
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::warn!("Foreign key violation: {}", message);
                EngineError::store("Record is still referenced by sales or shipments")
            }
            DbError::CheckViolation { message } => {
                tracing::error!("Constraint violation: {}", message);
                EngineError::store(format!("Constraint violation: {}", message))
            }
            err @ (DbError::Busy(_) | DbError::PoolExhausted) => {
                tracing::warn!("Store busy: {}", err);
                EngineError::store("Database is busy, try again")
            }
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                EngineError::store("Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Database migration failed: {}", e);
                EngineError::store("Database migration failed")
            }
            DbError::QueryFailed(e) => {
                tracing::error!("Database query failed: {}", e);
                EngineError::store("Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                EngineError::store("Database transaction failed")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                EngineError::store("Database operation failed")
            }
        }
    }
}

/// Converts ledger rule violations to engine errors.
impl From<CoreError> for EngineError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound { entity, id } => EngineError::not_found(entity, id),
            CoreError::InsufficientStock {
                product_id,
                available,
                requested,
            } => EngineError {
                kind: ErrorKind::InsufficientStock,
                message: format!(
                    "Insufficient stock for product {}: {} available, {} requested",
                    product_id, available, requested
                ),
                product_id: Some(product_id),
            },
            CoreError::Validation(e) => EngineError::validation(e.to_string()),
        }
    }
}

impl From<ValidationError> for EngineError {
    fn from(err: ValidationError) -> Self {
        EngineError::validation(err.to_string())
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.kind, self.message)
    }
}

impl std::error::Error for EngineError {}
