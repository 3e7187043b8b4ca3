//! # Product Repository
//!
//! Product rows and the stock ledger.
//!
//! ## Guarded Stock Decrement
//! ```text
//! UPDATE Product
//!    SET AmountLeft = AmountLeft - :qty
//!  WHERE Product_ID = :id AND AmountLeft >= :qty
//!
//! rows_affected = 1  →  units taken
//! rows_affected = 0  →  not enough stock (nothing changed)
//! ```
//! Combined with the table's `CHECK (AmountLeft >= 0)` the stock ledger
//! cannot go negative whatever the caller checked beforehand.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use stockkeep_core::{Money, Product, ProductId, ProductUpdate};

const SELECT_PRODUCT: &str = r#"
    SELECT
        Product_ID AS id,
        Name       AS name,
        AmountLeft AS stock_on_hand,
        Price      AS unit_price,
        Rate       AS unit_cost
    FROM Product
"#;

/// Repository for product reads.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists all products in id order.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let sql = format!("{SELECT_PRODUCT} ORDER BY Product_ID");
        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    /// Gets a product by ID.
    pub async fn get(&self, id: ProductId) -> DbResult<Option<Product>> {
        let sql = format!("{SELECT_PRODUCT} WHERE Product_ID = ?");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(product)
    }
}

// =============================================================================
// Transactional Statements
// =============================================================================

/// Reads a product inside the caller's transaction.
pub async fn fetch(conn: &mut SqliteConnection, id: ProductId) -> DbResult<Option<Product>> {
    let sql = format!("{SELECT_PRODUCT} WHERE Product_ID = ?");
    let product = sqlx::query_as::<_, Product>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(product)
}

/// Inserts a product with zero stock.
pub async fn insert(
    conn: &mut SqliteConnection,
    name: &str,
    unit_price: Money,
    unit_cost: Money,
) -> DbResult<ProductId> {
    debug!(name = %name, price = %unit_price, "Inserting product");

    let result = sqlx::query("INSERT INTO Product (Name, AmountLeft, Price, Rate) VALUES (?, 0, ?, ?)")
        .bind(name)
        .bind(unit_price)
        .bind(unit_cost)
        .execute(&mut *conn)
        .await?;

    Ok(result.last_insert_rowid())
}

/// Overwrites the editable fields. Returns rows affected.
pub async fn update(conn: &mut SqliteConnection, id: ProductId, update: &ProductUpdate) -> DbResult<u64> {
    debug!(id, "Updating product");

    let result = sqlx::query(
        "UPDATE Product SET Name = ?, AmountLeft = ?, Price = ?, Rate = ? WHERE Product_ID = ?",
    )
    .bind(&update.name)
    .bind(update.stock_on_hand)
    .bind(update.unit_price)
    .bind(update.unit_cost)
    .bind(id)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}

/// Takes `quantity` units out of stock if at least that many are on hand.
///
/// Returns `false` (and changes nothing) when stock is short.
pub async fn take_stock(conn: &mut SqliteConnection, id: ProductId, quantity: i64) -> DbResult<bool> {
    let result = sqlx::query(
        "UPDATE Product SET AmountLeft = AmountLeft - ? WHERE Product_ID = ? AND AmountLeft >= ?",
    )
    .bind(quantity)
    .bind(id)
    .bind(quantity)
    .execute(&mut *conn)
    .await?;

    debug!(id, quantity, taken = result.rows_affected() == 1, "Stock decrement");
    Ok(result.rows_affected() == 1)
}

/// Puts `quantity` units back into stock.
pub async fn add_stock(conn: &mut SqliteConnection, id: ProductId, quantity: i64) -> DbResult<u64> {
    let result = sqlx::query("UPDATE Product SET AmountLeft = AmountLeft + ? WHERE Product_ID = ?")
        .bind(quantity)
        .bind(id)
        .execute(&mut *conn)
        .await?;

    debug!(id, quantity, "Stock increment");
    Ok(result.rows_affected())
}

/// Deletes a product. Fails with a foreign key violation while referenced.
pub async fn delete(conn: &mut SqliteConnection, id: ProductId) -> DbResult<u64> {
    debug!(id, "Deleting product");

    let result = sqlx::query("DELETE FROM Product WHERE Product_ID = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}
