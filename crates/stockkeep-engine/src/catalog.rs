//! # Catalog Maintenance
//!
//! Adding, editing and removing clients, products and sellers.
//!
//! Each call is its own transaction. Deletes that would orphan a sale or a
//! shipment line are refused by the store and surface as `Store` errors;
//! nothing cascades into the ledgers.

use tracing::info;

use stockkeep_core::validation::{validate_amount, validate_count, validate_name};
use stockkeep_core::{
    ClientId, ClientUpdate, NewClient, NewProduct, ProductId, ProductUpdate, SellerId,
};
use stockkeep_db::repository::{client, product, seller};
use stockkeep_db::Database;

use crate::error::{EngineError, EngineResult};
use crate::logged;
use crate::shipment::distinct;

/// Catalog manager.
#[derive(Debug, Clone, Copy)]
pub struct Catalog<'a> {
    db: &'a Database,
}

impl<'a> Catalog<'a> {
    pub fn new(db: &'a Database) -> Self {
        Catalog { db }
    }

    // =========================================================================
    // Clients
    // =========================================================================

    /// Adds a client with a zero purchase count.
    pub async fn add_client(&self, new_client: NewClient) -> EngineResult<ClientId> {
        let name = validate_name("client name", &new_client.name)?;
        let preferences = new_client.preferences.trim().to_string();

        let result = self
            .db
            .transaction(move |conn| {
                Box::pin(async move {
                    let id = client::insert(conn, &name, &preferences).await?;
                    Ok::<_, EngineError>(id)
                })
            })
            .await;

        if let Ok(id) = &result {
            info!(client_id = id, "Client added");
        }
        logged("add_client", result)
    }

    /// Overwrites a client's name, preferences and purchase count.
    pub async fn edit_client(&self, id: ClientId, update: ClientUpdate) -> EngineResult<()> {
        let update = ClientUpdate {
            name: validate_name("client name", &update.name)?,
            preferences: update.preferences.trim().to_string(),
            purchase_count: update.purchase_count,
        };
        validate_count("purchase count", update.purchase_count)?;

        let result = self
            .db
            .transaction(move |conn| {
                Box::pin(async move {
                    if client::update(conn, id, &update).await? == 0 {
                        return Err(EngineError::not_found("Client", id));
                    }
                    Ok::<_, EngineError>(())
                })
            })
            .await;
        logged("edit_client", result)
    }

    /// Removes a client that has no sales.
    pub async fn delete_client(&self, id: ClientId) -> EngineResult<()> {
        let result = self
            .db
            .transaction(move |conn| {
                Box::pin(async move {
                    if client::delete(conn, id).await? == 0 {
                        return Err(EngineError::not_found("Client", id));
                    }
                    Ok::<_, EngineError>(())
                })
            })
            .await;

        if result.is_ok() {
            info!(client_id = id, "Client deleted");
        }
        logged("delete_client", result)
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Adds a product with zero stock. Stock arrives through shipments.
    pub async fn add_product(&self, new_product: NewProduct) -> EngineResult<ProductId> {
        let name = validate_name("product name", &new_product.name)?;
        validate_amount("price", new_product.unit_price)?;
        validate_amount("rate", new_product.unit_cost)?;

        let result = self
            .db
            .transaction(move |conn| {
                Box::pin(async move {
                    let id = product::insert(
                        conn,
                        &name,
                        new_product.unit_price,
                        new_product.unit_cost,
                    )
                    .await?;
                    Ok::<_, EngineError>(id)
                })
            })
            .await;

        if let Ok(id) = &result {
            info!(product_id = id, "Product added");
        }
        logged("add_product", result)
    }

    /// Overwrites a product's name, stock level, price and rate.
    ///
    /// Existing sales and shipments keep the prices they were recorded with.
    pub async fn edit_product(&self, id: ProductId, update: ProductUpdate) -> EngineResult<()> {
        let update = ProductUpdate {
            name: validate_name("product name", &update.name)?,
            ..update
        };
        validate_count("stock", update.stock_on_hand)?;
        validate_amount("price", update.unit_price)?;
        validate_amount("rate", update.unit_cost)?;

        let result = self
            .db
            .transaction(move |conn| {
                Box::pin(async move {
                    if product::update(conn, id, &update).await? == 0 {
                        return Err(EngineError::not_found("Product", id));
                    }
                    Ok::<_, EngineError>(())
                })
            })
            .await;
        logged("edit_product", result)
    }

    /// Removes a batch of products in one transaction.
    ///
    /// A product still referenced by a sale or shipment line blocks the whole
    /// batch. A repeated id is deleted once. Returns the number of products
    /// removed.
    pub async fn delete_products(&self, ids: &[ProductId]) -> EngineResult<u64> {
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
                        if product::delete(conn, id).await? == 0 {
                            return Err(EngineError::not_found("Product", id));
                        }
                        removed += 1;
                    }
                    Ok::<_, EngineError>(removed)
                })
            })
            .await;

        if let Ok(removed) = &result {
            info!(removed, "Products deleted");
        }
        logged("delete_products", result)
    }

    // =========================================================================
    // Sellers
    // =========================================================================

    /// Adds a seller with no cash. Seller names are unique.
    pub async fn add_seller(&self, name: &str) -> EngineResult<SellerId> {
        let name = validate_name("seller name", name)?;

        let result = self
            .db
            .transaction(move |conn| {
                Box::pin(async move {
                    let id = seller::insert(conn, &name).await?;
                    Ok::<_, EngineError>(id)
                })
            })
            .await;

        if let Ok(id) = &result {
            info!(seller_id = id, "Seller added");
        }
        logged("add_seller", result)
    }

    /// Removes a seller that has no sales.
    pub async fn delete_seller(&self, id: SellerId) -> EngineResult<()> {
        let result = self
            .db
            .transaction(move |conn| {
                Box::pin(async move {
                    if seller::delete(conn, id).await? == 0 {
                        return Err(EngineError::not_found("Seller", id));
                    }
                    Ok::<_, EngineError>(())
                })
            })
            .await;

        if result.is_ok() {
            info!(seller_id = id, "Seller deleted");
        }
        logged("delete_seller", result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::test_support::{day, Fixture};
    use stockkeep_core::{
        Money, NewSale, NewShipment, PaymentStatus, SaleLine, ShipmentExpenses, ShipmentLine,
        MAX_AMOUNT,
    };

    async fn sell_apple(fx: &Fixture) {
        fx.engine
            .sales()
            .create_sale(NewSale {
                client_id: fx.client,
                seller_id: fx.seller,
                payment_status: PaymentStatus::Paid,
                sale_date: day(1),
                lines: vec![SaleLine {
                    product_id: fx.apple,
                    quantity: 1,
                }],
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_add_and_edit_client() {
        let fx = Fixture::new().await;
        let catalog = fx.engine.catalog();

        let id = catalog
            .add_client(NewClient {
                name: "  Dora ".to_string(),
                preferences: " Pear".to_string(),
            })
            .await
            .unwrap();

        let stored = fx.engine.database().clients().get(id).await.unwrap().unwrap();
        assert_eq!(stored.name, "Dora");
        assert_eq!(stored.preferences, "Pear");
        assert_eq!(stored.purchase_count, 0);

        catalog
            .edit_client(
                id,
                ClientUpdate {
                    name: "Dora B".to_string(),
                    preferences: "Apple".to_string(),
                    purchase_count: 7,
                },
            )
            .await
            .unwrap();
        assert_eq!(fx.purchases(id).await, 7);

        let err = catalog
            .edit_client(
                id,
                ClientUpdate {
                    name: "Dora B".to_string(),
                    preferences: String::new(),
                    purchase_count: -1,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let err = catalog
            .edit_client(
                9999,
                ClientUpdate {
                    name: "Ghost".to_string(),
                    preferences: String::new(),
                    purchase_count: 0,
                },
            )
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_names_are_validated() {
        let fx = Fixture::new().await;
        let catalog = fx.engine.catalog();

        let blank = catalog
            .add_client(NewClient {
                name: "   ".to_string(),
                preferences: String::new(),
            })
            .await
            .unwrap_err();
        assert_eq!(blank.kind, ErrorKind::Validation);

        let long = catalog.add_seller(&"x".repeat(201)).await.unwrap_err();
        assert_eq!(long.kind, ErrorKind::Validation);

        let duplicate = catalog.add_seller(" Ann ").await.unwrap_err();
        assert_eq!(duplicate.kind, ErrorKind::Validation);

        let negative = catalog
            .add_product(NewProduct {
                name: "Plum".to_string(),
                unit_price: Money::from_cents(-1),
                unit_cost: Money::zero(),
            })
            .await
            .unwrap_err();
        assert_eq!(negative.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_product_lifecycle() {
        let fx = Fixture::new().await;
        let catalog = fx.engine.catalog();

        let plum = catalog
            .add_product(NewProduct {
                name: "Plum".to_string(),
                unit_price: Money::from_cents(250),
                unit_cost: Money::from_cents(90),
            })
            .await
            .unwrap();
        assert_eq!(fx.stock(plum).await, 0);

        let err = catalog
            .edit_product(
                plum,
                ProductUpdate {
                    name: "Plum".to_string(),
                    stock_on_hand: -3,
                    unit_price: Money::from_cents(250),
                    unit_cost: Money::from_cents(90),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let err = catalog
            .edit_product(
                plum,
                ProductUpdate {
                    name: "Plum".to_string(),
                    stock_on_hand: 0,
                    unit_price: Money::from_cents(MAX_AMOUNT.cents() + 1),
                    unit_cost: Money::from_cents(90),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        assert_eq!(catalog.delete_products(&[plum, plum]).await.unwrap(), 1);
        assert!(catalog.delete_products(&[plum]).await.unwrap_err().is_not_found());
        assert_eq!(catalog.delete_products(&[]).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_referenced_records_cannot_be_deleted() {
        let fx = Fixture::new().await;
        let catalog = fx.engine.catalog();
        sell_apple(&fx).await;

        let err = catalog.delete_client(fx.client).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Store);

        let err = catalog.delete_seller(fx.seller).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Store);

        // pear is free but apple is sold: the batch fails as a whole
        let err = catalog.delete_products(&[fx.pear, fx.apple]).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Store);
        assert_eq!(fx.stock(fx.pear).await, 10);

        catalog.delete_seller(fx.other_seller).await.unwrap();
        assert!(catalog.delete_seller(fx.other_seller).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_shipment_line_blocks_product_delete() {
        let fx = Fixture::new().await;

        fx.engine
            .shipments()
            .create_shipment(NewShipment {
                deliveryman: "Dan".to_string(),
                delivery_date: day(1),
                expenses: ShipmentExpenses::default(),
                lines: vec![ShipmentLine {
                    product_id: fx.pear,
                    quantity: 2,
                    rate: Money::from_cents(100),
                }],
            })
            .await
            .unwrap();

        let err = fx.engine.catalog().delete_products(&[fx.pear]).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Store);
    }
}
