//! # Shipment Operations
//!
//! Receiving deliveries, editing their headers and browsing them.
//!
//! ## create_shipment Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  validate (deliveryman, lines, rates, expenses) ← before the transaction│
//! │       │                                                                 │
//! │  BEGIN IMMEDIATE                                                        │
//! │       │                                                                 │
//! │  INSERT Shipment (revenue = 0, profit = 0)                              │
//! │       │                                                                 │
//! │  for each line:                                                         │
//! │    read product price                          NotFound → ROLLBACK      │
//! │    tally revenue and margin                                             │
//! │    INSERT ShipmentItem (cost = qty × rate)                              │
//! │    stock += qty                                                         │
//! │       │                                                                 │
//! │  profit = margin − expenses; UPDATE Shipment totals                     │
//! │       │                                                                 │
//! │  COMMIT → ShipmentReceipt { shipment_id, revenue, gross_profit }        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Deleting shipments leaves product stock as it is.

use tracing::info;

use stockkeep_core::ledger::{self, ShipmentTally};
use stockkeep_core::validation::{validate_expenses, validate_name, validate_new_shipment};
use stockkeep_core::{
    CoreError, NewShipment, Shipment, ShipmentDetail, ShipmentEdit, ShipmentFilter, ShipmentId,
    ShipmentReceipt, ShipmentSummary,
};
use stockkeep_db::repository::{product, shipment as shipments};
use stockkeep_db::Database;

use crate::error::{EngineError, EngineResult};
use crate::logged;

/// Shipment transaction manager.
#[derive(Debug, Clone, Copy)]
pub struct ShipmentManager<'a> {
    db: &'a Database,
}

impl<'a> ShipmentManager<'a> {
    pub fn new(db: &'a Database) -> Self {
        ShipmentManager { db }
    }

    /// Records a delivery, restocks its products and stores its revenue and
    /// gross profit, all in one transaction.
    pub async fn create_shipment(&self, new_shipment: NewShipment) -> EngineResult<ShipmentReceipt> {
        let deliveryman = validate_new_shipment(&new_shipment)?;

        let result = self
            .db
            .transaction(move |conn| {
                Box::pin(async move {
                    let shipment_id = shipments::insert_header(
                        conn,
                        &deliveryman,
                        new_shipment.delivery_date,
                        &new_shipment.expenses,
                    )
                    .await?;

                    let mut tally = ShipmentTally::new();
                    for line in &new_shipment.lines {
                        let item = product::fetch(conn, line.product_id)
                            .await?
                            .ok_or_else(|| CoreError::not_found("Product", line.product_id))?;

                        let cost = tally.add_item(item.unit_price, line.rate, line.quantity)?;
                        shipments::insert_item(
                            conn,
                            shipment_id,
                            item.id,
                            line.quantity,
                            line.rate,
                            cost,
                        )
                        .await?;
                        product::add_stock(conn, item.id, line.quantity).await?;
                    }

                    let totals = tally.finish(&new_shipment.expenses)?;
                    shipments::set_totals(conn, shipment_id, totals.revenue, totals.gross_profit)
                        .await?;

                    Ok::<_, EngineError>(ShipmentReceipt {
                        shipment_id,
                        revenue: totals.revenue,
                        gross_profit: totals.gross_profit,
                    })
                })
            })
            .await;

        if let Ok(receipt) = &result {
            info!(
                shipment_id = receipt.shipment_id,
                revenue_cents = receipt.revenue.cents(),
                gross_profit_cents = receipt.gross_profit.cents(),
                "Shipment committed"
            );
        }
        logged("create_shipment", result)
    }

    /// Deletes a batch of shipments and their items in one transaction.
    ///
    /// An unknown id fails the whole batch. A repeated id is deleted once.
    /// Returns the number of shipments removed.
    pub async fn delete_shipments(&self, ids: &[ShipmentId]) -> EngineResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let ids = distinct(ids);

        let result = self
            .db
            .transaction(move |conn| {
                Box::pin(async move {
                    let mut removed: u64 = 0;
                    for &id in &ids {
                        shipments::delete_items(conn, id).await?;
                        if shipments::delete(conn, id).await? == 0 {
                            return Err(EngineError::not_found("Shipment", id));
                        }
                        removed += 1;
                    }
                    Ok::<_, EngineError>(removed)
                })
            })
            .await;

        if let Ok(removed) = &result {
            info!(removed, "Shipments deleted");
        }
        logged("delete_shipments", result)
    }

    /// Rewrites the deliveryman, date and expenses of a shipment.
    ///
    /// Items stay as received. The stored gross profit moves by the change in
    /// total expenses; revenue is untouched.
    pub async fn edit_shipment(&self, id: ShipmentId, edit: ShipmentEdit) -> EngineResult<Shipment> {
        let deliveryman = validate_name("deliveryman", &edit.deliveryman)?;
        validate_expenses(&edit.expenses)?;

        let result = self
            .db
            .transaction(move |conn| {
                Box::pin(async move {
                    let current = shipments::fetch(conn, id)
                        .await?
                        .ok_or_else(|| EngineError::not_found("Shipment", id))?;

                    let gross_profit = ledger::profit_after_expense_change(
                        current.gross_profit,
                        &current.expenses(),
                        &edit.expenses,
                    )?;
                    shipments::update_header(
                        conn,
                        id,
                        &deliveryman,
                        edit.delivery_date,
                        &edit.expenses,
                        gross_profit,
                    )
                    .await?;

                    let updated = shipments::fetch(conn, id)
                        .await?
                        .ok_or_else(|| EngineError::not_found("Shipment", id))?;
                    Ok::<_, EngineError>(updated)
                })
            })
            .await;

        if let Ok(shipment) = &result {
            info!(
                shipment_id = id,
                gross_profit_cents = shipment.gross_profit.cents(),
                "Shipment edited"
            );
        }
        logged("edit_shipment", result)
    }

    /// Lists shipments, optionally only those containing a product with the
    /// given name, in the requested order.
    pub async fn apply_filter(&self, filter: ShipmentFilter) -> EngineResult<Vec<ShipmentSummary>> {
        let product_name = filter
            .product_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());
        let filter = ShipmentFilter {
            product_name,
            sort: filter.sort,
        };

        let rows = self.db.shipments().list(&filter).await.map_err(EngineError::from);
        logged("apply_filter", rows)
    }

    /// One shipment with its expenses and product lines.
    pub async fn shipment_detail(&self, id: ShipmentId) -> EngineResult<ShipmentDetail> {
        let detail = async {
            let repo = self.db.shipments();
            let shipment = repo
                .get(id)
                .await?
                .ok_or_else(|| EngineError::not_found("Shipment", id))?;
            let items = repo.item_lines(id).await?;
            Ok::<_, EngineError>(ShipmentDetail { shipment, items })
        }
        .await;
        logged("shipment_detail", detail)
    }
}

/// Ids in first-seen order, without repeats.
pub(crate) fn distinct(ids: &[i64]) -> Vec<i64> {
    let mut unique = Vec::with_capacity(ids.len());
    for &id in ids {
        if !unique.contains(&id) {
            unique.push(id);
        }
    }
    unique
}

// =============================================================================
// Unit Tests
// =============================================================================
