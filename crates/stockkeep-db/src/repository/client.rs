//! # Client Repository
//!
//! Client rows and the purchase-count ledger.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use stockkeep_core::{Client, ClientId, ClientUpdate};

const SELECT_CLIENT: &str = r#"
    SELECT
        Client_ID         AS id,
        Name              AS name,
        Preferences       AS preferences,
        NumberOfPurchases AS purchase_count
    FROM Client
"#;

/// Repository for client reads.
#[derive(Debug, Clone)]
pub struct ClientRepository {
    pool: SqlitePool,
}

impl ClientRepository {
    /// Creates a new ClientRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ClientRepository { pool }
    }

    /// Lists all clients sorted by name.
    pub async fn list_by_name(&self) -> DbResult<Vec<Client>> {
        let sql = format!("{SELECT_CLIENT} ORDER BY Name, Client_ID");
        let clients = sqlx::query_as::<_, Client>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(clients)
    }

    /// Gets a client by ID.
    pub async fn get(&self, id: ClientId) -> DbResult<Option<Client>> {
        let sql = format!("{SELECT_CLIENT} WHERE Client_ID = ?");
        let client = sqlx::query_as::<_, Client>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(client)
    }
}

// =============================================================================
// Transactional Statements
// =============================================================================

/// Reads a client inside the caller's transaction.
pub async fn fetch(conn: &mut SqliteConnection, id: ClientId) -> DbResult<Option<Client>> {
    let sql = format!("{SELECT_CLIENT} WHERE Client_ID = ?");
    let client = sqlx::query_as::<_, Client>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(client)
}

/// Inserts a client with a zero purchase count.
pub async fn insert(conn: &mut SqliteConnection, name: &str, preferences: &str) -> DbResult<ClientId> {
    debug!(name = %name, "Inserting client");

    let result = sqlx::query(
        "INSERT INTO Client (Name, Preferences, NumberOfPurchases) VALUES (?, ?, 0)",
    )
    .bind(name)
    .bind(preferences)
    .execute(&mut *conn)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Overwrites the editable fields. Returns rows affected.
pub async fn update(conn: &mut SqliteConnection, id: ClientId, update: &ClientUpdate) -> DbResult<u64> {
    debug!(id, "Updating client");

    let result = sqlx::query(
        "UPDATE Client SET Name = ?, Preferences = ?, NumberOfPurchases = ? WHERE Client_ID = ?",
    )
    .bind(&update.name)
    .bind(&update.preferences)
    .bind(update.purchase_count)
    .bind(id)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}

/// Adds `quantity` to the purchase count.
pub async fn add_purchases(conn: &mut SqliteConnection, id: ClientId, quantity: i64) -> DbResult<u64> {
    let result = sqlx::query(
        "UPDATE Client SET NumberOfPurchases = NumberOfPurchases + ? WHERE Client_ID = ?",
    )
    .bind(quantity)
    .bind(id)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}

/// Sets the purchase count to an absolute value.
pub async fn set_purchases(conn: &mut SqliteConnection, id: ClientId, count: i64) -> DbResult<u64> {
    let result = sqlx::query("UPDATE Client SET NumberOfPurchases = ? WHERE Client_ID = ?")
        .bind(count)
        .bind(id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}

/// Deletes a client. Fails with a foreign key violation while sales reference it.
pub async fn delete(conn: &mut SqliteConnection, id: ClientId) -> DbResult<u64> {
    debug!(id, "Deleting client");

    let result = sqlx::query("DELETE FROM Client WHERE Client_ID = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}
