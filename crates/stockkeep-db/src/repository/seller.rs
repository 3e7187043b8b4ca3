//! # Seller Repository
//!
//! Seller rows and the cash-on-hand ledger.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use stockkeep_core::{Money, Seller, SellerCash, SellerId};

const SELECT_SELLER: &str = r#"
    SELECT
        Seller_ID  AS id,
        Name       AS name,
        CashOnHand AS cash_on_hand
    FROM Seller
"#;

/// Repository for seller reads.
#[derive(Debug, Clone)]
pub struct SellerRepository {
    pool: SqlitePool,
}

impl SellerRepository {
    /// Creates a new SellerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SellerRepository { pool }
    }

    /// Lists all sellers sorted by name.
    pub async fn list_by_name(&self) -> DbResult<Vec<Seller>> {
        let sql = format!("{SELECT_SELLER} ORDER BY Name");
        let sellers = sqlx::query_as::<_, Seller>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(sellers)
    }

    /// Gets a seller by ID.
    pub async fn get(&self, id: SellerId) -> DbResult<Option<Seller>> {
        let sql = format!("{SELECT_SELLER} WHERE Seller_ID = ?");
        let seller = sqlx::query_as::<_, Seller>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(seller)
    }

    /// Cash on hand and recognized revenue per seller, sorted by name.
    ///
    /// Recognized revenue sums the seller's Paid and Unpaid sales.
    pub async fn cash_positions(&self) -> DbResult<Vec<SellerCash>> {
        let rows = sqlx::query_as::<_, SellerCash>(
            r#"
            SELECT
                s.Seller_ID  AS seller_id,
                s.Name       AS name,
                s.CashOnHand AS cash_on_hand,
                COALESCE((
                    SELECT SUM(sa.TotalRevenue)
                    FROM Sale sa
                    WHERE sa.Seller_ID = s.Seller_ID
                      AND sa.PaymentStatus IN ('Paid', 'Unpaid')
                ), 0)        AS recognized_revenue
            FROM Seller s
            ORDER BY s.Name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

// =============================================================================
// Transactional Statements
// =============================================================================

/// Reads a seller inside the caller's transaction.
pub async fn fetch(conn: &mut SqliteConnection, id: SellerId) -> DbResult<Option<Seller>> {
    let sql = format!("{SELECT_SELLER} WHERE Seller_ID = ?");
    let seller = sqlx::query_as::<_, Seller>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(seller)
}

/// Resolves a seller by exact name.
pub async fn find_by_name(conn: &mut SqliteConnection, name: &str) -> DbResult<Option<Seller>> {
    let sql = format!("{SELECT_SELLER} WHERE Name = ?");
    let seller = sqlx::query_as::<_, Seller>(&sql)
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(seller)
}

/// Inserts a seller with zero cash. Names are unique.
pub async fn insert(conn: &mut SqliteConnection, name: &str) -> DbResult<SellerId> {
    debug!(name = %name, "Inserting seller");

    let result = sqlx::query("INSERT INTO Seller (Name, CashOnHand) VALUES (?, 0)")
        .bind(name)
        .execute(&mut *conn)
        .await?;

    Ok(result.last_insert_rowid())
}

/// Adds `delta` (possibly negative) to the seller's cash.
pub async fn adjust_cash(conn: &mut SqliteConnection, id: SellerId, delta: Money) -> DbResult<u64> {
    if delta.is_zero() {
        return Ok(0);
    }

    let result = sqlx::query("UPDATE Seller SET CashOnHand = CashOnHand + ? WHERE Seller_ID = ?")
        .bind(delta)
        .bind(id)
        .execute(&mut *conn)
        .await?;

    debug!(id, delta = %delta, "Cash adjusted");
    Ok(result.rows_affected())
}

/// Sets every seller's cash to zero. Returns sellers touched.
pub async fn reset_all_cash(conn: &mut SqliteConnection) -> DbResult<u64> {
    let result = sqlx::query("UPDATE Seller SET CashOnHand = 0")
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}

/// Deletes a seller. Fails with a foreign key violation while sales reference it.
pub async fn delete(conn: &mut SqliteConnection, id: SellerId) -> DbResult<u64> {
    debug!(id, "Deleting seller");

    let result = sqlx::query("DELETE FROM Seller WHERE Seller_ID = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}
