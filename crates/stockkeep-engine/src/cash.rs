//! Cash counter reset.
//!
//! Zeroes every seller's cash on hand and every sale's frozen revenue in one
//! transaction. There is no undo; callers confirm with the user first.

use tracing::info;

use stockkeep_core::ResetReport;
use stockkeep_db::repository::{sale as sales, seller};
use stockkeep_db::Database;

use crate::error::{EngineError, EngineResult};
use crate::logged;

/// Cash reset manager.
#[derive(Debug, Clone, Copy)]
pub struct CashManager<'a> {
    db: &'a Database,
}

impl<'a> CashManager<'a> {
    pub fn new(db: &'a Database) -> Self {
        CashManager { db }
    }

    /// Sets all seller cash and all sale revenue to zero.
    ///
    /// Stock, purchase counts and shipments are left alone.
    pub async fn reset_cash_counters(&self) -> EngineResult<ResetReport> {
        let result = self
            .db
            .transaction(|conn| {
                Box::pin(async move {
                    let sellers_reset = seller::reset_all_cash(conn).await?;
                    let sales_zeroed = sales::zero_all_revenue(conn).await?;
                    Ok::<_, EngineError>(ResetReport {
                        sellers_reset,
                        sales_zeroed,
                    })
                })
            })
            .await;

        if let Ok(report) = &result {
            info!(
                sellers_reset = report.sellers_reset,
                sales_zeroed = report.sales_zeroed,
                "Cash counters reset"
            );
        }
        logged("reset_cash_counters", result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{day, Fixture};
    use stockkeep_core::{NewSale, PaymentStatus, SaleLine};

    #[tokio::test]
    async fn test_reset_zeroes_cash_and_revenue() {
        let fx = Fixture::new().await;

        for (seller_id, status) in [
            (fx.seller, PaymentStatus::Paid),
            (fx.other_seller, PaymentStatus::Unpaid),
        ] {
            fx.engine
                .sales()
                .create_sale(NewSale {
                    client_id: fx.client,
                    seller_id,
                    payment_status: status,
                    sale_date: day(3),
                    lines: vec![SaleLine {
                        product_id: fx.apple,
                        quantity: 2,
                    }],
                })
                .await
                .unwrap();
        }
        assert_eq!(fx.cash(fx.seller).await, 1000);

        let report = fx.engine.cash().reset_cash_counters().await.unwrap();
        assert_eq!(report.sellers_reset, 2);
        assert_eq!(report.sales_zeroed, 2);

        assert_eq!(fx.cash(fx.seller).await, 0);
        assert_eq!(fx.cash(fx.other_seller).await, 0);
        assert_eq!(fx.stock(fx.apple).await, 6);
        assert_eq!(fx.purchases(fx.client).await, 4);

        let summary = fx.engine.queries().seller_cash_summary().await.unwrap();
        assert!(summary.total_cash_on_hand.is_zero());
        assert!(summary.total_recognized_revenue.is_zero());

        let sales = fx.engine.queries().list_sales().await.unwrap();
        assert!(sales.iter().all(|s| s.total_revenue.is_zero()));
    }

    #[tokio::test]
    async fn test_reset_on_empty_ledger() {
        let fx = Fixture::new().await;

        let report = fx.engine.cash().reset_cash_counters().await.unwrap();
        assert_eq!(report.sellers_reset, 2);
        assert_eq!(report.sales_zeroed, 0);
    }
}
