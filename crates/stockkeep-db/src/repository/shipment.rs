//! # Shipment Repository
//!
//! Shipment headers and their item lines.
//!
//! ## Filtered Listing
//! ```text
//! Shipment s
//!   WHERE name IS NULL
//!      OR EXISTS (ShipmentItem i ⋈ Product p
//!                 WHERE i.Shipment_ID = s.Shipment_ID AND p.Name = name)
//!   ORDER BY  All         → Shipment_ID
//!             NewestFirst → DeliveryDate DESC, Shipment_ID DESC
//!             OldestFirst → DeliveryDate ASC,  Shipment_ID ASC
//! ```
//! One row per shipment however many matching items it has.

use chrono::NaiveDate;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use stockkeep_core::{
    Money, ProductId, Shipment, ShipmentExpenses, ShipmentFilter, ShipmentId, ShipmentItem,
    ShipmentItemLine, ShipmentSort, ShipmentSummary,
};

const SELECT_SHIPMENT: &str = r#"
    SELECT
        Shipment_ID      AS id,
        Deliveryman      AS deliveryman,
        DeliveryDate     AS delivery_date,
        DeliveryExpense  AS delivery_expense,
        EquipmentExpense AS equipment_expense,
        EmployeeExpense  AS employee_expense,
        Revenue          AS revenue,
        GrossProfit      AS gross_profit
    FROM Shipment
"#;

const SELECT_SUMMARY: &str = r#"
    SELECT
        s.Shipment_ID  AS id,
        s.Deliveryman  AS deliveryman,
        s.DeliveryDate AS delivery_date,
        s.GrossProfit  AS gross_profit,
        s.Revenue      AS revenue
    FROM Shipment s
    WHERE ? IS NULL
       OR EXISTS (
            SELECT 1
            FROM ShipmentItem i
            JOIN Product p ON p.Product_ID = i.Product_ID
            WHERE i.Shipment_ID = s.Shipment_ID
              AND p.Name = ?
       )
"#;

fn order_clause(sort: ShipmentSort) -> &'static str {
    match sort {
        ShipmentSort::All => "ORDER BY s.Shipment_ID",
        ShipmentSort::NewestFirst => "ORDER BY s.DeliveryDate DESC, s.Shipment_ID DESC",
        ShipmentSort::OldestFirst => "ORDER BY s.DeliveryDate ASC, s.Shipment_ID ASC",
    }
}

/// Repository for shipment reads.
#[derive(Debug, Clone)]
pub struct ShipmentRepository {
    pool: SqlitePool,
}

impl ShipmentRepository {
    /// Creates a new ShipmentRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ShipmentRepository { pool }
    }

    /// Lists shipment headers matching `filter`.
    pub async fn list(&self, filter: &ShipmentFilter) -> DbResult<Vec<ShipmentSummary>> {
        let sql = format!("{SELECT_SUMMARY} {}", order_clause(filter.sort));
        let rows = sqlx::query_as::<_, ShipmentSummary>(&sql)
            .bind(filter.product_name.as_deref())
            .bind(filter.product_name.as_deref())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Gets a shipment header by ID.
    pub async fn get(&self, id: ShipmentId) -> DbResult<Option<Shipment>> {
        let sql = format!("{SELECT_SHIPMENT} WHERE Shipment_ID = ?");
        let shipment = sqlx::query_as::<_, Shipment>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(shipment)
    }

    /// Items of a shipment joined with product names, in insertion order.
    pub async fn item_lines(&self, id: ShipmentId) -> DbResult<Vec<ShipmentItemLine>> {
        let rows = sqlx::query_as::<_, ShipmentItemLine>(
            r#"
            SELECT
                i.Product_ID AS product_id,
                p.Name       AS product_name,
                i.Input      AS quantity_received,
                i.Rate       AS rate,
                i.Cost       AS cost
            FROM ShipmentItem i
            JOIN Product p ON p.Product_ID = i.Product_ID
            WHERE i.Shipment_ID = ?
            ORDER BY i.ShipmentItem_ID
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Raw item rows of a shipment.
    pub async fn items(&self, id: ShipmentId) -> DbResult<Vec<ShipmentItem>> {
        let rows = sqlx::query_as::<_, ShipmentItem>(
            r#"
            SELECT
                ShipmentItem_ID AS id,
                Shipment_ID     AS shipment_id,
                Product_ID      AS product_id,
                Input           AS quantity_received,
                Rate            AS rate,
                Cost            AS cost
            FROM ShipmentItem
            WHERE Shipment_ID = ?
            ORDER BY ShipmentItem_ID
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

// =============================================================================
// Transactional Statements
// =============================================================================

/// Reads a shipment header inside the caller's transaction.
pub async fn fetch(conn: &mut SqliteConnection, id: ShipmentId) -> DbResult<Option<Shipment>> {
    let sql = format!("{SELECT_SHIPMENT} WHERE Shipment_ID = ?");
    let shipment = sqlx::query_as::<_, Shipment>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(shipment)
}

/// Inserts a shipment header with zero revenue and profit.
pub async fn insert_header(
    conn: &mut SqliteConnection,
    deliveryman: &str,
    delivery_date: NaiveDate,
    expenses: &ShipmentExpenses,
) -> DbResult<ShipmentId> {
    debug!(deliveryman = %deliveryman, %delivery_date, "Inserting shipment");

    let result = sqlx::query(
        r#"
        INSERT INTO Shipment (
            Deliveryman, DeliveryDate,
            DeliveryExpense, EquipmentExpense, EmployeeExpense,
            GrossProfit, Revenue
        ) VALUES (?, ?, ?, ?, ?, 0, 0)
        "#,
    )
    .bind(deliveryman)
    .bind(delivery_date)
    .bind(expenses.delivery)
    .bind(expenses.equipment)
    .bind(expenses.employee)
    .execute(&mut *conn)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Inserts one received line.
pub async fn insert_item(
    conn: &mut SqliteConnection,
    shipment_id: ShipmentId,
    product_id: ProductId,
    quantity: i64,
    rate: Money,
    cost: Money,
) -> DbResult<i64> {
    let result = sqlx::query(
        "INSERT INTO ShipmentItem (Shipment_ID, Product_ID, Input, Rate, Cost) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(shipment_id)
    .bind(product_id)
    .bind(quantity)
    .bind(rate)
    .bind(cost)
    .execute(&mut *conn)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Writes the computed revenue and gross profit.
pub async fn set_totals(
    conn: &mut SqliteConnection,
    id: ShipmentId,
    revenue: Money,
    gross_profit: Money,
) -> DbResult<u64> {
    let result = sqlx::query("UPDATE Shipment SET Revenue = ?, GrossProfit = ? WHERE Shipment_ID = ?")
        .bind(revenue)
        .bind(gross_profit)
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}

/// Rewrites the editable header fields and the adjusted profit.
pub async fn update_header(
    conn: &mut SqliteConnection,
    id: ShipmentId,
    deliveryman: &str,
    delivery_date: NaiveDate,
    expenses: &ShipmentExpenses,
    gross_profit: Money,
) -> DbResult<u64> {
    debug!(id, "Updating shipment header");

    let result = sqlx::query(
        r#"
        UPDATE Shipment
        SET Deliveryman = ?, DeliveryDate = ?,
            DeliveryExpense = ?, EquipmentExpense = ?, EmployeeExpense = ?,
            GrossProfit = ?
        WHERE Shipment_ID = ?
        "#,
    )
    .bind(deliveryman)
    .bind(delivery_date)
    .bind(expenses.delivery)
    .bind(expenses.equipment)
    .bind(expenses.employee)
    .bind(gross_profit)
    .bind(id)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}

/// Deletes a shipment's items. Returns rows removed.
pub async fn delete_items(conn: &mut SqliteConnection, id: ShipmentId) -> DbResult<u64> {
    let result = sqlx::query("DELETE FROM ShipmentItem WHERE Shipment_ID = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}

/// Deletes a shipment header. Returns rows removed (0 when unknown).
pub async fn delete(conn: &mut SqliteConnection, id: ShipmentId) -> DbResult<u64> {
    let result = sqlx::query("DELETE FROM Shipment WHERE Shipment_ID = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}
