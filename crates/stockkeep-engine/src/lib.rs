//! # stockkeep-engine: Inventory & Ledger Transaction Engine
//!
//! Every business operation as one atomic store transaction that keeps four
//! ledgers consistent: product stock, client purchase counts, seller cash on
//! hand and shipment revenue/profit.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Engine Surface                                 │
//! │                                                                         │
//! │  UI collaborators (forms, tables, seed tool)                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Engine (THIS CRATE, Clone)                      │   │
//! │  │                                                                 │   │
//! │  │   sales()      create_sale, set_payment_status, amend_sale,    │   │
//! │  │                delete_sale, sale_detail                         │   │
//! │  │   shipments()  create_shipment, delete_shipments,              │   │
//! │  │                edit_shipment, apply_filter, shipment_detail     │   │
//! │  │   cash()       reset_cash_counters                              │   │
//! │  │   catalog()    clients / products / sellers CRUD                │   │
//! │  │   queries()    list_* views, seller_cash_summary                │   │
//! │  └──────────────────────────────┬──────────────────────────────────┘   │
//! │                                 │ Database::transaction(|conn| ..)      │
//! │                                 ▼                                       │
//! │  stockkeep-db (SQLite)     stockkeep-core (ledger arithmetic)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! use stockkeep_engine::{Engine, EngineConfig};
//!
//! let engine = Engine::open(&EngineConfig::load_or_default(None)).await?;
//! let receipt = engine.sales().create_sale(new_sale).await?;
//! let summary = engine.queries().seller_cash_summary().await?;
//! ```
//!
//! The engine caches nothing; every view reads the store afresh.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cash;
pub mod catalog;
pub mod config;
pub mod error;
pub mod query;
pub mod sale;
pub mod shipment;
pub mod telemetry;

#[cfg(test)]
mod test_support;

// =============================================================================
// Re-exports
// =============================================================================

pub use cash::CashManager;
pub use catalog::Catalog;
pub use config::{ConfigError, EngineConfig};
pub use error::{EngineError, EngineResult, ErrorKind};
pub use query::Queries;
pub use sale::SaleManager;
pub use shipment::ShipmentManager;

use stockkeep_core::AmendPolicy;
use stockkeep_db::Database;
use tracing::{info, warn};

// =============================================================================
// Engine
// =============================================================================

/// Handle to the transaction engine.
///
/// Cheap to clone; clones share one connection pool and can be used from
/// concurrent tasks.
#[derive(Debug, Clone)]
pub struct Engine {
    db: Database,
    amend_policy: AmendPolicy,
}

impl Engine {
    /// Opens the store described by `config` and applies migrations.
    pub async fn open(config: &EngineConfig) -> EngineResult<Self> {
        let db_config = config.db_config();

        if !db_config.is_in_memory() {
            if let Some(parent) = config.database.path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        EngineError::store(format!(
                            "Cannot create data directory {}: {}",
                            parent.display(),
                            e
                        ))
                    })?;
                }
            }
        }

        let db = Database::new(db_config).await?;
        info!(
            path = %config.database.path.display(),
            amend_policy = ?config.ledger.amend_policy,
            "Engine ready"
        );
        Ok(Engine::with_database(db, config.ledger.amend_policy))
    }

    /// Wraps an already opened database.
    pub fn with_database(db: Database, amend_policy: AmendPolicy) -> Self {
        Engine { db, amend_policy }
    }

    /// Returns the underlying database handle.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// The policy `amend_sale` applies.
    pub fn amend_policy(&self) -> AmendPolicy {
        self.amend_policy
    }

    /// Sale operations.
    pub fn sales(&self) -> SaleManager<'_> {
        SaleManager::new(&self.db, self.amend_policy)
    }

    /// Shipment operations.
    pub fn shipments(&self) -> ShipmentManager<'_> {
        ShipmentManager::new(&self.db)
    }

    /// Cash reset.
    pub fn cash(&self) -> CashManager<'_> {
        CashManager::new(&self.db)
    }

    /// Client, product and seller maintenance.
    pub fn catalog(&self) -> Catalog<'_> {
        Catalog::new(&self.db)
    }

    /// Read-only views.
    pub fn queries(&self) -> Queries<'_> {
        Queries::new(&self.db)
    }

    /// Closes the connection pool.
    pub async fn close(&self) {
        self.db.close().await;
    }
}

/// Logs a rejected operation and passes the result through.
pub(crate) fn logged<T>(operation: &'static str, result: EngineResult<T>) -> EngineResult<T> {
    if let Err(err) = &result {
        warn!(operation, kind = ?err.kind, error = %err.message, "Operation rejected");
    }
    result
}
