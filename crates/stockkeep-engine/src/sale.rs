//! # Sale Operations
//!
//! Creating, paying, amending and reversing sales.
//!
//! ## create_sale Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  validate lines (non-empty, 0 < qty ≤ max)    ← before the transaction │
//! │       │                                                                 │
//! │  BEGIN IMMEDIATE                                                        │
//! │       │                                                                 │
//! │  client exists? seller exists?                 NotFound → ROLLBACK      │
//! │       │                                                                 │
//! │  for each line:                                                         │
//! │    read product (price, stock)                 NotFound → ROLLBACK      │
//! │    revenue = price × qty                                                │
//! │    stock -= qty  (guarded)                     InsufficientStock        │
//! │    INSERT Sale row                                   → ROLLBACK         │
//! │    client.purchases += qty                                              │
//! │    if Paid: seller.cash += revenue                                      │
//! │       │                                                                 │
//! │  COMMIT → SaleReceipt { sale_ids, total_revenue }                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqliteConnection;
use tracing::info;

use stockkeep_core::ledger::{self, AmendmentPlan};
use stockkeep_core::validation::{validate_name, validate_new_sale, validate_quantity};
use stockkeep_core::{
    AmendPolicy, CoreError, Money, NewSale, PaymentChange, PaymentStatus, Sale, SaleAmendment,
    SaleId, SaleListing, SaleReceipt,
};
use stockkeep_db::repository::sale::SaleInsert;
use stockkeep_db::repository::{client, product, sale as sales, seller};
use stockkeep_db::Database;

use crate::error::{EngineError, EngineResult};
use crate::logged;

/// Sale transaction manager.
#[derive(Debug, Clone, Copy)]
pub struct SaleManager<'a> {
    db: &'a Database,
    amend_policy: AmendPolicy,
}

impl<'a> SaleManager<'a> {
    pub fn new(db: &'a Database, amend_policy: AmendPolicy) -> Self {
        SaleManager { db, amend_policy }
    }

    /// Records a (possibly multi-product) sale atomically.
    ///
    /// Every line becomes one Sale row sharing client, seller, date and
    /// status. If any line is short on stock, nothing is written.
    pub async fn create_sale(&self, new_sale: NewSale) -> EngineResult<SaleReceipt> {
        validate_new_sale(&new_sale)?;

        let result = self
            .db
            .transaction(move |conn| {
                Box::pin(async move {
                    client::fetch(conn, new_sale.client_id)
                        .await?
                        .ok_or_else(|| CoreError::not_found("Client", new_sale.client_id))?;
                    seller::fetch(conn, new_sale.seller_id)
                        .await?
                        .ok_or_else(|| CoreError::not_found("Seller", new_sale.seller_id))?;

                    let mut sale_ids = Vec::with_capacity(new_sale.lines.len());
                    let mut total_revenue = Money::zero();

                    for line in &new_sale.lines {
                        let item = product::fetch(conn, line.product_id)
                            .await?
                            .ok_or_else(|| CoreError::not_found("Product", line.product_id))?;

                        ledger::check_stock(item.id, item.stock_on_hand, line.quantity)?;
                        let revenue = ledger::line_revenue(item.unit_price, line.quantity)?;

                        if !product::take_stock(conn, item.id, line.quantity).await? {
                            return Err(CoreError::InsufficientStock {
                                product_id: item.id,
                                available: item.stock_on_hand,
                                requested: line.quantity,
                            }
                            .into());
                        }

                        let sale_id = sales::insert(
                            conn,
                            &SaleInsert {
                                client_id: new_sale.client_id,
                                product_id: item.id,
                                seller_id: new_sale.seller_id,
                                quantity: line.quantity,
                                sale_date: new_sale.sale_date,
                                payment_status: new_sale.payment_status,
                                total_revenue: revenue,
                            },
                        )
                        .await?;

                        client::add_purchases(conn, new_sale.client_id, line.quantity).await?;

                        if new_sale.payment_status.is_paid() {
                            seller::adjust_cash(conn, new_sale.seller_id, revenue).await?;
                        }

                        sale_ids.push(sale_id);
                        total_revenue = ledger::add_revenue(total_revenue, revenue)?;
                    }

                    Ok::<_, EngineError>(SaleReceipt {
                        sale_ids,
                        total_revenue,
                    })
                })
            })
            .await;

        if let Ok(receipt) = &result {
            info!(
                sale_ids = ?receipt.sale_ids,
                revenue_cents = receipt.total_revenue.cents(),
                "Sale committed"
            );
        }
        logged("create_sale", result)
    }

    /// Sets a sale's payment status and moves its revenue on or off the
    /// seller's cash.
    ///
    /// Setting the status it already has commits nothing but still succeeds,
    /// reported through [`PaymentChange::is_unchanged`].
    pub async fn set_payment_status(
        &self,
        sale_id: SaleId,
        status: PaymentStatus,
    ) -> EngineResult<PaymentChange> {
        let result = self
            .db
            .transaction(move |conn| {
                Box::pin(async move {
                    let sale = require_sale(conn, sale_id).await?;
                    let cash_delta =
                        ledger::payment_cash_delta(sale.payment_status, status, sale.total_revenue);

                    if sale.payment_status != status {
                        sales::set_status(conn, sale_id, status).await?;
                        seller::adjust_cash(conn, sale.seller_id, cash_delta).await?;
                    }

                    Ok::<_, EngineError>(PaymentChange {
                        sale_id,
                        previous: sale.payment_status,
                        current: status,
                        cash_delta,
                    })
                })
            })
            .await;

        if let Ok(change) = &result {
            info!(
                sale_id,
                previous = %change.previous,
                current = %change.current,
                cash_delta_cents = change.cash_delta.cents(),
                "Payment status set"
            );
        }
        logged("set_payment_status", result)
    }

    /// Rewrites a sale's quantity, seller (by exact name) and date.
    ///
    /// With [`AmendPolicy::RecordOnly`] only the row changes. With
    /// [`AmendPolicy::Rebalance`] the quantity and seller changes are also
    /// carried into stock, purchase count, frozen revenue and cash.
    pub async fn amend_sale(&self, sale_id: SaleId, amendment: SaleAmendment) -> EngineResult<Sale> {
        validate_quantity(amendment.quantity)?;
        let seller_name = validate_name("seller", &amendment.seller_name)?;
        let policy = self.amend_policy;

        let result = self
            .db
            .transaction(move |conn| {
                Box::pin(async move {
                    let original = require_sale(conn, sale_id).await?;
                    let new_seller = seller::find_by_name(conn, &seller_name)
                        .await?
                        .ok_or_else(|| CoreError::not_found("Seller", &seller_name))?;

                    let revenue = match policy {
                        AmendPolicy::RecordOnly => original.total_revenue,
                        AmendPolicy::Rebalance => {
                            let plan =
                                AmendmentPlan::compute(&original, amendment.quantity, new_seller.id)?;
                            rebalance(conn, &original, &plan).await?;
                            plan.new_revenue
                        }
                    };

                    sales::amend(
                        conn,
                        sale_id,
                        amendment.quantity,
                        new_seller.id,
                        amendment.sale_date,
                        revenue,
                    )
                    .await?;

                    let amended = require_sale(conn, sale_id).await?;
                    Ok::<_, EngineError>(amended)
                })
            })
            .await;

        if let Ok(sale) = &result {
            info!(
                sale_id,
                policy = ?policy,
                quantity = sale.quantity,
                seller_id = sale.seller_id,
                "Sale amended"
            );
        }
        logged("amend_sale", result)
    }

    /// Deletes a sale and reverses its ledger effects.
    ///
    /// Stock is returned, a Paid sale's revenue leaves the seller's cash and
    /// the client's purchase count drops by the quantity (never below zero).
    pub async fn delete_sale(&self, sale_id: SaleId) -> EngineResult<Sale> {
        let result = self
            .db
            .transaction(move |conn| {
                Box::pin(async move {
                    let sale = require_sale(conn, sale_id).await?;

                    product::add_stock(conn, sale.product_id, sale.quantity).await?;

                    let cash_delta =
                        ledger::reversal_cash_delta(sale.payment_status, sale.total_revenue);
                    seller::adjust_cash(conn, sale.seller_id, cash_delta).await?;

                    if let Some(buyer) = client::fetch(conn, sale.client_id).await? {
                        let count = ledger::floored_purchase_count(buyer.purchase_count, sale.quantity);
                        client::set_purchases(conn, buyer.id, count).await?;
                    }

                    sales::delete(conn, sale_id).await?;
                    Ok::<_, EngineError>(sale)
                })
            })
            .await;

        if let Ok(sale) = &result {
            info!(
                sale_id,
                restocked = sale.quantity,
                revenue_cents = sale.total_revenue.cents(),
                "Sale deleted"
            );
        }
        logged("delete_sale", result)
    }

    /// One sale with client, product and seller names.
    pub async fn sale_detail(&self, sale_id: SaleId) -> EngineResult<SaleListing> {
        let detail = self
            .db
            .sales()
            .listing(sale_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Sale", sale_id));
        logged("sale_detail", detail)
    }
}

async fn require_sale(conn: &mut SqliteConnection, sale_id: SaleId) -> EngineResult<Sale> {
    sales::fetch(conn, sale_id)
        .await?
        .ok_or_else(|| EngineError::not_found("Sale", sale_id))
}

/// Applies an amendment plan to stock, purchase count and cash.
async fn rebalance(
    conn: &mut SqliteConnection,
    original: &Sale,
    plan: &AmendmentPlan,
) -> EngineResult<()> {
    if plan.stock_delta < 0 {
        let wanted = -plan.stock_delta;
        if !product::take_stock(conn, original.product_id, wanted).await? {
            let available = product::fetch(conn, original.product_id)
                .await?
                .map(|p| p.stock_on_hand)
                .unwrap_or_default();
            return Err(CoreError::InsufficientStock {
                product_id: original.product_id,
                available,
                requested: wanted,
            }
            .into());
        }
    } else if plan.stock_delta > 0 {
        product::add_stock(conn, original.product_id, plan.stock_delta).await?;
    }

    if plan.purchase_delta != 0 {
        if let Some(buyer) = client::fetch(conn, original.client_id).await? {
            let count = (buyer.purchase_count + plan.purchase_delta).max(0);
            client::set_purchases(conn, buyer.id, count).await?;
        }
    }

    if let Some((seller_id, amount)) = plan.cash_out {
        seller::adjust_cash(conn, seller_id, -amount).await?;
    }
    if let Some((seller_id, amount)) = plan.cash_in {
        seller::adjust_cash(conn, seller_id, amount).await?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::test_support::{day, Fixture};
    use stockkeep_core::{AmendPolicy, SaleLine, MAX_QUANTITY};

    fn sale_of(fx: &Fixture, lines: &[(i64, i64)], status: PaymentStatus) -> NewSale {
        NewSale {
            client_id: fx.client,
            seller_id: fx.seller,
            payment_status: status,
            sale_date: day(1),
            lines: lines
                .iter()
                .map(|&(product_id, quantity)| SaleLine { product_id, quantity })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_paid_sale_moves_every_ledger() {
        let fx = Fixture::new().await;

        let receipt = fx
            .engine
            .sales()
            .create_sale(sale_of(&fx, &[(fx.apple, 4), (fx.pear, 2)], PaymentStatus::Paid))
            .await
            .unwrap();

        // apple 5.00, pear 3.00
        assert_eq!(receipt.sale_ids.len(), 2);
        assert_eq!(receipt.total_revenue.cents(), 4 * 500 + 2 * 300);

        assert_eq!(fx.stock(fx.apple).await, 6);
        assert_eq!(fx.stock(fx.pear).await, 8);
        assert_eq!(fx.purchases(fx.client).await, 6);
        assert_eq!(fx.cash(fx.seller).await, 2600);

        let row = fx
            .engine
            .database()
            .sales()
            .get(receipt.sale_ids[1])
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.product_id, fx.pear);
        assert_eq!(row.total_revenue.cents(), 600);
        assert_eq!(row.payment_status, PaymentStatus::Paid);
    }

    #[tokio::test]
    async fn test_oversized_quantity_is_rejected_and_store_survives() {
        let fx = Fixture::new().await;
        let sales = fx.engine.sales();
        fx.set_stock(fx.apple, i64::MAX / 2).await;

        let err = sales
            .create_sale(sale_of(&fx, &[(fx.apple, MAX_QUANTITY + 1)], PaymentStatus::Paid))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(fx.stock(fx.apple).await, i64::MAX / 2);
        assert_eq!(fx.cash(fx.seller).await, 0);

        let receipt = sales
            .create_sale(sale_of(&fx, &[(fx.apple, MAX_QUANTITY)], PaymentStatus::Paid))
            .await
            .unwrap();
        assert_eq!(receipt.total_revenue.cents(), 500 * MAX_QUANTITY);
        assert_eq!(fx.cash(fx.seller).await, 500 * MAX_QUANTITY);
    }

    #[tokio::test]
    async fn test_unpaid_sale_leaves_cash_alone() {
        let fx = Fixture::new().await;

        fx.engine
            .sales()
            .create_sale(sale_of(&fx, &[(fx.apple, 3)], PaymentStatus::Unpaid))
            .await
            .unwrap();

        assert_eq!(fx.stock(fx.apple).await, 7);
        assert_eq!(fx.purchases(fx.client).await, 3);
        assert_eq!(fx.cash(fx.seller).await, 0);
    }

    #[tokio::test]
    async fn test_short_line_rolls_back_whole_sale() {
        let fx = Fixture::new().await;

        let err = fx
            .engine
            .sales()
            .create_sale(sale_of(&fx, &[(fx.apple, 5), (fx.pear, 1000)], PaymentStatus::Paid))
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::InsufficientStock);
        assert_eq!(err.product_id, Some(fx.pear));

        assert_eq!(fx.stock(fx.apple).await, 10);
        assert_eq!(fx.stock(fx.pear).await, 10);
        assert_eq!(fx.purchases(fx.client).await, 0);
        assert_eq!(fx.cash(fx.seller).await, 0);
        assert!(fx.engine.queries().list_sales().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_same_product_twice_sees_its_own_decrement() {
        let fx = Fixture::new().await;

        let err = fx
            .engine
            .sales()
            .create_sale(sale_of(&fx, &[(fx.apple, 6), (fx.apple, 6)], PaymentStatus::Paid))
            .await
            .unwrap_err();

        assert!(err.is_insufficient_stock());
        assert_eq!(fx.stock(fx.apple).await, 10);
    }

    #[tokio::test]
    async fn test_selling_exact_stock_reaches_zero() {
        let fx = Fixture::new().await;

        fx.engine
            .sales()
            .create_sale(sale_of(&fx, &[(fx.apple, 10)], PaymentStatus::Paid))
            .await
            .unwrap();

        assert_eq!(fx.stock(fx.apple).await, 0);
    }

    #[tokio::test]
    async fn test_sale_rejects_bad_input_and_missing_refs() {
        let fx = Fixture::new().await;
        let sales = fx.engine.sales();

        let err = sales
            .create_sale(sale_of(&fx, &[], PaymentStatus::Paid))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let err = sales
            .create_sale(sale_of(&fx, &[(fx.apple, 0)], PaymentStatus::Paid))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let mut missing_client = sale_of(&fx, &[(fx.apple, 1)], PaymentStatus::Paid);
        missing_client.client_id = 9999;
        assert!(sales.create_sale(missing_client).await.unwrap_err().is_not_found());

        let err = sales
            .create_sale(sale_of(&fx, &[(fx.apple, 1), (9999, 1)], PaymentStatus::Paid))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(fx.stock(fx.apple).await, 10);
    }

    #[tokio::test]
    async fn test_payment_toggle_is_idempotent() {
        let fx = Fixture::new().await;
        let sales = fx.engine.sales();

        let receipt = sales
            .create_sale(sale_of(&fx, &[(fx.apple, 2)], PaymentStatus::Unpaid))
            .await
            .unwrap();
        let sale_id = receipt.sale_ids[0];

        let change = sales.set_payment_status(sale_id, PaymentStatus::Paid).await.unwrap();
        assert_eq!(change.cash_delta.cents(), 1000);
        assert_eq!(fx.cash(fx.seller).await, 1000);

        let again = sales.set_payment_status(sale_id, PaymentStatus::Paid).await.unwrap();
        assert!(again.is_unchanged());
        assert!(again.cash_delta.is_zero());
        assert_eq!(fx.cash(fx.seller).await, 1000);

        sales.set_payment_status(sale_id, PaymentStatus::Unpaid).await.unwrap();
        assert_eq!(fx.cash(fx.seller).await, 0);

        let err = sales.set_payment_status(9999, PaymentStatus::Paid).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete_reverses_paid_sale() {
        let fx = Fixture::new().await;
        let sales = fx.engine.sales();

        let receipt = sales
            .create_sale(sale_of(&fx, &[(fx.apple, 4)], PaymentStatus::Paid))
            .await
            .unwrap();

        let removed = sales.delete_sale(receipt.sale_ids[0]).await.unwrap();
        assert_eq!(removed.quantity, 4);

        assert_eq!(fx.stock(fx.apple).await, 10);
        assert_eq!(fx.cash(fx.seller).await, 0);
        assert_eq!(fx.purchases(fx.client).await, 0);
        assert!(sales.delete_sale(receipt.sale_ids[0]).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_delete_floors_purchase_count() {
        let fx = Fixture::new().await;
        let sales = fx.engine.sales();

        let receipt = sales
            .create_sale(sale_of(&fx, &[(fx.apple, 4)], PaymentStatus::Unpaid))
            .await
            .unwrap();
        fx.set_purchases(fx.client, 1).await;

        sales.delete_sale(receipt.sale_ids[0]).await.unwrap();

        assert_eq!(fx.purchases(fx.client).await, 0);
        assert_eq!(fx.cash(fx.seller).await, 0);
    }

    #[tokio::test]
    async fn test_record_only_amend_touches_only_the_row() {
        let fx = Fixture::with_policy(AmendPolicy::RecordOnly).await;
        let sales = fx.engine.sales();

        let receipt = sales
            .create_sale(sale_of(&fx, &[(fx.apple, 4)], PaymentStatus::Paid))
            .await
            .unwrap();
        let sale_id = receipt.sale_ids[0];

        let amended = sales
            .amend_sale(
                sale_id,
                SaleAmendment {
                    quantity: 6,
                    seller_name: "Bob".to_string(),
                    sale_date: day(9),
                },
            )
            .await
            .unwrap();

        assert_eq!(amended.quantity, 6);
        assert_eq!(amended.seller_id, fx.other_seller);
        assert_eq!(amended.sale_date, day(9));
        assert_eq!(amended.total_revenue.cents(), 2000);

        assert_eq!(fx.stock(fx.apple).await, 6);
        assert_eq!(fx.purchases(fx.client).await, 4);
        assert_eq!(fx.cash(fx.seller).await, 2000);
        assert_eq!(fx.cash(fx.other_seller).await, 0);
    }

    #[tokio::test]
    async fn test_rebalance_amend_moves_stock_and_cash() {
        let fx = Fixture::with_policy(AmendPolicy::Rebalance).await;
        assert_eq!(fx.engine.amend_policy(), AmendPolicy::Rebalance);
        let sales = fx.engine.sales();

        let receipt = sales
            .create_sale(sale_of(&fx, &[(fx.apple, 4)], PaymentStatus::Paid))
            .await
            .unwrap();
        let sale_id = receipt.sale_ids[0];

        let amended = sales
            .amend_sale(
                sale_id,
                SaleAmendment {
                    quantity: 6,
                    seller_name: "Bob".to_string(),
                    sale_date: day(2),
                },
            )
            .await
            .unwrap();

        assert_eq!(amended.total_revenue.cents(), 3000);
        assert_eq!(fx.stock(fx.apple).await, 4);
        assert_eq!(fx.purchases(fx.client).await, 6);
        assert_eq!(fx.cash(fx.seller).await, 0);
        assert_eq!(fx.cash(fx.other_seller).await, 3000);
    }

    #[tokio::test]
    async fn test_rebalance_amend_respects_stock() {
        let fx = Fixture::with_policy(AmendPolicy::Rebalance).await;
        let sales = fx.engine.sales();

        let receipt = sales
            .create_sale(sale_of(&fx, &[(fx.apple, 4)], PaymentStatus::Paid))
            .await
            .unwrap();

        let err = sales
            .amend_sale(
                receipt.sale_ids[0],
                SaleAmendment {
                    quantity: 11,
                    seller_name: "Ann".to_string(),
                    sale_date: day(1),
                },
            )
            .await
            .unwrap_err();

        assert!(err.is_insufficient_stock());
        assert_eq!(fx.stock(fx.apple).await, 6);
        assert_eq!(fx.cash(fx.seller).await, 2000);
    }

    #[tokio::test]
    async fn test_amend_unknown_seller_is_not_found() {
        let fx = Fixture::new().await;
        let sales = fx.engine.sales();

        let receipt = sales
            .create_sale(sale_of(&fx, &[(fx.apple, 1)], PaymentStatus::Paid))
            .await
            .unwrap();

        let err = sales
            .amend_sale(
                receipt.sale_ids[0],
                SaleAmendment {
                    quantity: 1,
                    seller_name: "Nobody".to_string(),
                    sale_date: day(1),
                },
            )
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        let err = sales
            .amend_sale(
                receipt.sale_ids[0],
                SaleAmendment {
                    quantity: 0,
                    seller_name: "Ann".to_string(),
                    sale_date: day(1),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_sale_detail_joins_names() {
        let fx = Fixture::new().await;

        let receipt = fx
            .engine
            .sales()
            .create_sale(sale_of(&fx, &[(fx.pear, 3)], PaymentStatus::Unpaid))
            .await
            .unwrap();

        let detail = fx.engine.sales().sale_detail(receipt.sale_ids[0]).await.unwrap();
        assert_eq!(detail.client_name, "Carla");
        assert_eq!(detail.product_name, "Pear");
        assert_eq!(detail.seller_name, "Ann");
        assert_eq!(detail.quantity, 3);
        assert_eq!(detail.payment_status, PaymentStatus::Unpaid);

        assert!(fx.engine.sales().sale_detail(9999).await.unwrap_err().is_not_found());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_sales_never_oversell() {
        let fx = Fixture::on_file("concurrent-sales").await;
        fx.set_stock(fx.apple, 5).await;

        let a = {
            let engine = fx.engine.clone();
            let sale = sale_of(&fx, &[(fx.apple, 5)], PaymentStatus::Paid);
            tokio::spawn(async move { engine.sales().create_sale(sale).await })
        };
        let b = {
            let engine = fx.engine.clone();
            let sale = sale_of(&fx, &[(fx.apple, 5)], PaymentStatus::Paid);
            tokio::spawn(async move { engine.sales().create_sale(sale).await })
        };

        let results = [a.await.unwrap(), b.await.unwrap()];
        let committed = results.iter().filter(|r| r.is_ok()).count();

        assert_eq!(committed, 1);
        assert_eq!(fx.stock(fx.apple).await, 0);
        assert_eq!(fx.cash(fx.seller).await, 2500);

        fx.cleanup().await;
    }
}
