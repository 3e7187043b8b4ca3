//! # stockkeep-db: Store Layer for Stockkeep
//!
//! This crate provides database access for the Stockkeep transaction engine.
//! It uses SQLite for storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockkeep Data Flow                              │
//! │                                                                         │
//! │  Engine operation (create_sale)                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   stockkeep-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (sale.rs ...) │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │    │ reads on pool │    │ 0001_initial │  │   │
//! │  │   │ transaction() │◄───│ writes on the │    │              │  │   │
//! │  │   │               │    │ tx connection │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (WAL)                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and the scoped transaction API
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Statements per table (client, product, seller, sale, shipment)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stockkeep_db::{Database, DbConfig, DbError};
//! use stockkeep_db::repository::seller;
//!
//! let db = Database::new(DbConfig::new("stockkeep.db")).await?;
//!
//! let seller_id = db
//!     .transaction(|conn| Box::pin(async move {
//!         seller::insert(conn, "Ann").await
//!     }))
//!     .await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig, TxFuture};

// Repository re-exports for convenience
pub use repository::client::ClientRepository;
pub use repository::product::ProductRepository;
pub use repository::sale::SaleRepository;
pub use repository::seller::SellerRepository;
pub use repository::shipment::ShipmentRepository;
