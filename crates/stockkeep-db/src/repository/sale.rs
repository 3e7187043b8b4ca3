//! # Sale Repository
//!
//! Sale rows: one row per product line of a customer sale.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                    │
//! │                                                                         │
//! │  1. CREATE                                                             │
//! │     └── insert() per line, revenue frozen at price × qty               │
//! │                                                                         │
//! │  2. (OPTIONAL) TOGGLE PAYMENT                                          │
//! │     └── set_status() Paid ⇄ Unpaid                                     │
//! │                                                                         │
//! │  3. (OPTIONAL) AMEND                                                   │
//! │     └── amend() quantity, seller, date (+ revenue when rebalancing)    │
//! │                                                                         │
//! │  4. (OPTIONAL) DELETE                                                  │
//! │     └── delete() after the ledgers are reversed                        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use stockkeep_core::{
    ClientId, Money, PaymentStatus, ProductId, Sale, SaleId, SaleListing, SellerId,
};

const SELECT_SALE: &str = r#"
    SELECT
        Sale_ID       AS id,
        Client_ID     AS client_id,
        Product_ID    AS product_id,
        Seller_ID     AS seller_id,
        Quantity      AS quantity,
        SaleDate      AS sale_date,
        PaymentStatus AS payment_status,
        TotalRevenue  AS total_revenue
    FROM Sale
"#;

const SELECT_LISTING: &str = r#"
    SELECT
        s.Sale_ID       AS id,
        c.Name          AS client_name,
        p.Name          AS product_name,
        s.Quantity      AS quantity,
        s.SaleDate      AS sale_date,
        s.PaymentStatus AS payment_status,
        se.Name         AS seller_name,
        s.TotalRevenue  AS total_revenue
    FROM Sale s
    JOIN Client  c  ON c.Client_ID   = s.Client_ID
    JOIN Product p  ON p.Product_ID  = s.Product_ID
    JOIN Seller  se ON se.Seller_ID  = s.Seller_ID
"#;

/// Column values of a new sale row.
#[derive(Debug, Clone, Copy)]
pub struct SaleInsert {
    pub client_id: ClientId,
    pub product_id: ProductId,
    pub seller_id: SellerId,
    pub quantity: i64,
    pub sale_date: NaiveDate,
    pub payment_status: PaymentStatus,
    pub total_revenue: Money,
}

/// Repository for sale reads.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Lists every sale joined with client, product and seller names.
    pub async fn list(&self) -> DbResult<Vec<SaleListing>> {
        let sql = format!("{SELECT_LISTING} ORDER BY s.Sale_ID");
        let sales = sqlx::query_as::<_, SaleListing>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(sales)
    }

    /// One sale joined with its display names.
    pub async fn listing(&self, id: SaleId) -> DbResult<Option<SaleListing>> {
        let sql = format!("{SELECT_LISTING} WHERE s.Sale_ID = ?");
        let sale = sqlx::query_as::<_, SaleListing>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(sale)
    }

    /// Gets a raw sale row by ID.
    pub async fn get(&self, id: SaleId) -> DbResult<Option<Sale>> {
        let sql = format!("{SELECT_SALE} WHERE Sale_ID = ?");
        let sale = sqlx::query_as::<_, Sale>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(sale)
    }
}

// =============================================================================
// Transactional Statements
// =============================================================================

/// Reads a sale inside the caller's transaction.
pub async fn fetch(conn: &mut SqliteConnection, id: SaleId) -> DbResult<Option<Sale>> {
    let sql = format!("{SELECT_SALE} WHERE Sale_ID = ?");
    let sale = sqlx::query_as::<_, Sale>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(sale)
}

/// Inserts one sale row and returns its id.
pub async fn insert(conn: &mut SqliteConnection, row: &SaleInsert) -> DbResult<SaleId> {
    debug!(
        client_id = row.client_id,
        product_id = row.product_id,
        quantity = row.quantity,
        "Inserting sale"
    );

    let result = sqlx::query(
        r#"
        INSERT INTO Sale (
            Client_ID, Product_ID, Seller_ID, Quantity,
            SaleDate, PaymentStatus, TotalRevenue
        ) VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(row.client_id)
    .bind(row.product_id)
    .bind(row.seller_id)
    .bind(row.quantity)
    .bind(row.sale_date)
    .bind(row.payment_status)
    .bind(row.total_revenue)
    .execute(&mut *conn)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Sets the payment status column.
pub async fn set_status(conn: &mut SqliteConnection, id: SaleId, status: PaymentStatus) -> DbResult<u64> {
    let result = sqlx::query("UPDATE Sale SET PaymentStatus = ? WHERE Sale_ID = ?")
        .bind(status)
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}

/// Rewrites quantity, seller, date and revenue of a sale row.
pub async fn amend(
    conn: &mut SqliteConnection,
    id: SaleId,
    quantity: i64,
    seller_id: SellerId,
    sale_date: NaiveDate,
    total_revenue: Money,
) -> DbResult<u64> {
    debug!(id, quantity, seller_id, "Amending sale");

    let result = sqlx::query(
        r#"
        UPDATE Sale
        SET Quantity = ?, Seller_ID = ?, SaleDate = ?, TotalRevenue = ?
        WHERE Sale_ID = ?
        "#,
    )
    .bind(quantity)
    .bind(seller_id)
    .bind(sale_date)
    .bind(total_revenue)
    .bind(id)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}

/// Deletes a sale row.
pub async fn delete(conn: &mut SqliteConnection, id: SaleId) -> DbResult<u64> {
    let result = sqlx::query("DELETE FROM Sale WHERE Sale_ID = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}

/// Sets every sale's revenue to zero. Returns rows touched.
pub async fn zero_all_revenue(conn: &mut SqliteConnection) -> DbResult<u64> {
    let result = sqlx::query("UPDATE Sale SET TotalRevenue = 0")
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}
