//! Read-only views. Every call reads the store afresh.

use stockkeep_core::{
    CashSummary, Client, Product, SaleListing, Seller, ShipmentFilter, ShipmentSummary,
};
use stockkeep_db::Database;

use crate::error::{EngineError, EngineResult};
use crate::logged;
use crate::shipment::ShipmentManager;

/// Listing and report queries.
#[derive(Debug, Clone, Copy)]
pub struct Queries<'a> {
    db: &'a Database,
}

impl<'a> Queries<'a> {
    pub fn new(db: &'a Database) -> Self {
        Queries { db }
    }

    /// Clients sorted by name.
    pub async fn list_clients(&self) -> EngineResult<Vec<Client>> {
        let rows = self.db.clients().list_by_name().await.map_err(EngineError::from);
        logged("list_clients", rows)
    }

    /// Products in id order.
    pub async fn list_products(&self) -> EngineResult<Vec<Product>> {
        let rows = self.db.products().list().await.map_err(EngineError::from);
        logged("list_products", rows)
    }

    /// Sellers sorted by name.
    pub async fn list_sellers(&self) -> EngineResult<Vec<Seller>> {
        let rows = self.db.sellers().list_by_name().await.map_err(EngineError::from);
        logged("list_sellers", rows)
    }

    /// Sales joined with client, product and seller names.
    pub async fn list_sales(&self) -> EngineResult<Vec<SaleListing>> {
        let rows = self.db.sales().list().await.map_err(EngineError::from);
        logged("list_sales", rows)
    }

    /// All shipments in insertion order.
    pub async fn list_shipments(&self) -> EngineResult<Vec<ShipmentSummary>> {
        ShipmentManager::new(self.db)
            .apply_filter(ShipmentFilter::default())
            .await
    }

    /// Cash on hand and recognized revenue per seller, with grand totals.
    ///
    /// Recognized revenue counts both Paid and Unpaid sales.
    pub async fn seller_cash_summary(&self) -> EngineResult<CashSummary> {
        let summary = self
            .db
            .sellers()
            .cash_positions()
            .await
            .map(CashSummary::from_sellers)
            .map_err(EngineError::from);
        logged("seller_cash_summary", summary)
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::{day, Fixture};
    use stockkeep_core::{NewClient, NewSale, PaymentStatus, SaleLine};

    fn sale(fx: &Fixture, seller_id: i64, quantity: i64, status: PaymentStatus) -> NewSale {
        NewSale {
            client_id: fx.client,
            seller_id,
            payment_status: status,
            sale_date: day(5),
            lines: vec![SaleLine {
                product_id: fx.apple,
                quantity,
            }],
        }
    }

    #[tokio::test]
    async fn test_cash_summary_counts_paid_and_unpaid() {
        let fx = Fixture::new().await;
        let sales = fx.engine.sales();

        sales
            .create_sale(sale(&fx, fx.seller, 2, PaymentStatus::Paid))
            .await
            .unwrap();
        sales
            .create_sale(sale(&fx, fx.seller, 1, PaymentStatus::Unpaid))
            .await
            .unwrap();
        sales
            .create_sale(sale(&fx, fx.other_seller, 3, PaymentStatus::Unpaid))
            .await
            .unwrap();

        let summary = fx.engine.queries().seller_cash_summary().await.unwrap();

        let ann = summary.seller("Ann").unwrap();
        assert_eq!(ann.cash_on_hand.cents(), 1000);
        assert_eq!(ann.recognized_revenue.cents(), 1500);

        let bob = summary.seller("Bob").unwrap();
        assert_eq!(bob.cash_on_hand.cents(), 0);
        assert_eq!(bob.recognized_revenue.cents(), 1500);

        assert_eq!(summary.total_cash_on_hand.cents(), 1000);
        assert_eq!(summary.total_recognized_revenue.cents(), 3000);
    }

    #[tokio::test]
    async fn test_sellers_without_sales_show_zero() {
        let fx = Fixture::new().await;

        let summary = fx.engine.queries().seller_cash_summary().await.unwrap();
        assert_eq!(summary.sellers.len(), 2);
        assert!(summary.total_recognized_revenue.is_zero());
    }

    #[tokio::test]
    async fn test_list_ordering() {
        let fx = Fixture::new().await;
        let queries = fx.engine.queries();

        fx.engine
            .catalog()
            .add_client(NewClient {
                name: "Abe".to_string(),
                preferences: String::new(),
            })
            .await
            .unwrap();
        fx.engine.catalog().add_seller("Aaron").await.unwrap();

        let clients: Vec<String> = queries
            .list_clients()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(clients, vec!["Abe", "Carla"]);

        let sellers: Vec<String> = queries
            .list_sellers()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(sellers, vec!["Aaron", "Ann", "Bob"]);

        let products: Vec<i64> = queries
            .list_products()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(products, vec![fx.apple, fx.pear]);

        assert!(queries.list_shipments().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_sales_joins_names() {
        let fx = Fixture::new().await;

        fx.engine
            .sales()
            .create_sale(sale(&fx, fx.other_seller, 2, PaymentStatus::Paid))
            .await
            .unwrap();

        let rows = fx.engine.queries().list_sales().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].client_name, "Carla");
        assert_eq!(rows[0].product_name, "Apple");
        assert_eq!(rows[0].seller_name, "Bob");
        assert_eq!(rows[0].total_revenue.cents(), 1000);
    }
}
