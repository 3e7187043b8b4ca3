//! # stockkeep-core: Pure Ledger Logic for Stockkeep
//!
//! This crate holds the domain model and every piece of arithmetic the
//! transaction engine relies on, as pure functions with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockkeep Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              UI collaborators (forms, tables, CLI)              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ Engine operations                      │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    stockkeep-engine                             │   │
//! │  │    create_sale, set_payment_status, create_shipment, ...        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ stockkeep-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  ledger   │  │ validation│  │   │
//! │  │   │  Client   │  │   Money   │  │ revenue   │  │  parsers  │  │   │
//! │  │   │  Sale     │  │           │  │ profit    │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  stockkeep-db (Database Layer)                  │   │
//! │  │            SQLite statements, migrations, transactions          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Client, Product, Seller, Sale, Shipment, ...)
//! - [`money`] - Money type with integer arithmetic
//! - [`ledger`] - Revenue, profit and cash/stock delta rules
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation and text parsing
//!
//! ## Example Usage
//!
//! ```rust
//! use stockkeep_core::ledger::ShipmentTally;
//! use stockkeep_core::{Money, ShipmentExpenses};
//!
//! let mut tally = ShipmentTally::new();
//! tally.add_item(Money::from_cents(500), Money::from_cents(200), 10)?;
//!
//! let expenses = ShipmentExpenses::new(
//!     Money::from_cents(100),
//!     Money::from_cents(100),
//!     Money::from_cents(100),
//! );
//! let totals = tally.finish(&expenses)?;
//!
//! assert_eq!(totals.revenue.cents(), 5000);
//! assert_eq!(totals.gross_profit.cents(), 2700);
//! # Ok::<(), stockkeep_core::CoreError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod ledger;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length of any display name (client, product, seller, deliveryman).
pub const MAX_NAME_LEN: usize = 200;

/// Maximum number of lines accepted in one sale or shipment.
///
/// ## Business Reason
/// Keeps a single transaction bounded; a larger delivery is split by the
/// caller into several shipments.
pub const MAX_LINES_PER_OPERATION: usize = 100;

/// Largest quantity accepted on a single sale or shipment line.
pub const MAX_QUANTITY: i64 = 1_000_000;

/// Largest price, rate or expense accepted.
///
/// Together with [`MAX_QUANTITY`] this keeps line totals far inside `i64`
/// cents; sums across lines are still checked.
pub const MAX_AMOUNT: Money = Money::from_cents(100_000_000_000);
