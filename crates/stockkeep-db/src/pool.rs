//! # Database Pool Management
//!
//! Connection pool creation, configuration and the scoped transaction API.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Database Connection Pool                           │
//! │                                                                         │
//! │  DbConfig::new(path) ← Configure pool settings                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::new(config).await ← Create pool + run migrations            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────┐                           │
//! │  │            SqlitePool                    │                           │
//! │  │  ┌─────┐ ┌─────┐ ┌─────┐ ┌─────┐       │                           │
//! │  │  │Conn1│ │Conn2│ │Conn3│ │Conn4│ ...   │  (max_connections)        │
//! │  │  └─────┘ └─────┘ └─────┘ └─────┘       │                           │
//! │  └─────────────────────────────────────────┘                           │
//! │       │                                                                 │
//! │       ├── Query views   ──► any free connection, no transaction        │
//! │       └── Operations    ──► transaction(|conn| ...)                     │
//! │                             BEGIN IMMEDIATE → body → COMMIT/ROLLBACK   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Write Serialization
//! Every transaction starts with `BEGIN IMMEDIATE`, so it holds the SQLite
//! write lock from its first read. A second writer waits up to
//! `busy_timeout` for the lock and then reads the committed state, which
//! keeps read-check-write sequences (stock checks) consistent. WAL mode lets
//! the query views keep reading meanwhile.

use sqlx::pool::PoolConnection;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteConnection, SqliteJournalMode, SqlitePoolOptions,
    SqliteSynchronous,
};
use sqlx::{Sqlite, SqlitePool};
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::client::ClientRepository;
use crate::repository::product::ProductRepository;
use crate::repository::sale::SaleRepository;
use crate::repository::seller::SellerRepository;
use crate::repository::shipment::ShipmentRepository;

/// Path marker for an in-memory database.
const IN_MEMORY: &str = ":memory:";

/// Boxed future returned by a [`Database::transaction`] body.
pub type TxFuture<'c, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'c>>;

// =============================================================================
// Configuration
// =============================================================================

/// Database configuration.
///
/// ## Example
/// ```rust
/// use std::time::Duration;
/// use stockkeep_db::DbConfig;
///
/// let config = DbConfig::new("/path/to/stockkeep.db")
///     .max_connections(5)
///     .busy_timeout(Duration::from_secs(2));
/// assert_eq!(config.max_connections, 5);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 5
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    /// Default: 1
    pub min_connections: u32,

    /// How long to wait for a free pool connection.
    /// Default: 30 seconds
    pub acquire_timeout: Duration,

    /// How long SQLite waits for a lock held by another writer.
    /// Default: 5 seconds
    pub busy_timeout: Duration,

    /// Idle timeout before closing a connection.
    /// Default: 10 minutes (never for in-memory databases)
    pub idle_timeout: Option<Duration>,

    /// Whether to run migrations on connect.
    /// Default: true
    pub run_migrations: bool,
}

impl DbConfig {
    /// Creates a new database configuration with the given path.
    ///
    /// The file is created if it doesn't exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(30),
            busy_timeout: Duration::from_secs(5),
            idle_timeout: Some(Duration::from_secs(600)),
            run_migrations: true,
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum number of connections.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets the pool acquire timeout.
    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    /// Sets the SQLite busy timeout.
    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Sets whether to run migrations on connect.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Creates an in-memory database configuration (for testing).
    ///
    /// The database lives as long as its single pooled connection.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(IN_MEMORY),
            max_connections: 1,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            busy_timeout: Duration::from_secs(5),
            idle_timeout: None,
            run_migrations: true,
        }
    }

    /// True when this configuration targets an in-memory database.
    pub fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == IN_MEMORY
    }

    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        let options = if self.is_in_memory() {
            SqliteConnectOptions::from_str("sqlite::memory:")
        } else {
            SqliteConnectOptions::from_str(&format!(
                "sqlite://{}?mode=rwc",
                self.database_path.display()
            ))
        }
        .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        Ok(options
            // Readers don't block the writer and vice versa
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            // SQLite has them disabled by default
            .foreign_keys(true)
            .busy_timeout(self.busy_timeout)
            .create_if_missing(true))
    }
}

// =============================================================================
// Database
// =============================================================================

/// Main database handle providing repository access and transactions.
///
/// Cheap to clone: clones share the same pool.
#[derive(Debug, Clone)]
pub struct Database {
    /// The SQLite connection pool.
    pool: SqlitePool,
}

impl Database {
    /// Creates a new database connection pool.
    ///
    /// ## What This Does
    /// 1. Creates the database file if it doesn't exist
    /// 2. Configures WAL, NORMAL synchronous, foreign keys and busy timeout
    /// 3. Creates the connection pool
    /// 4. Runs migrations (if enabled)
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Initializing database connection"
        );

        let connect_options = config.connect_options()?;
        debug!("Connection options configured");

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout)
            .idle_timeout(config.idle_timeout);

        if config.is_in_memory() {
            pool_options = pool_options.max_lifetime(None);
        }

        let pool = pool_options
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            busy_timeout_ms = config.busy_timeout.as_millis() as u64,
            "Database pool created"
        );

        let db = Database { pool };

        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Runs database migrations. Idempotent.
    pub async fn run_migrations(&self) -> DbResult<()> {
        info!("Running database migrations");
        migrations::run_migrations(&self.pool).await?;
        info!("Migrations complete");
        Ok(())
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Runs `body` inside one write transaction.
    ///
    /// ## Lifecycle
    /// ```text
    /// acquire ──► BEGIN IMMEDIATE ──► body(conn)
    ///                                   │
    ///                     Ok(value) ◄───┴───► Err(e)
    ///                        │                  │
    ///                     COMMIT             ROLLBACK
    ///                        │                  │
    ///                   Ok(value)            Err(e)
    /// ```
    /// The connection goes back to the pool afterwards. If the returned
    /// future is dropped mid-way, the connection is closed instead, which
    /// discards the open transaction.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let count = db
    ///     .transaction(|conn| Box::pin(async move {
    ///         let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM Sale")
    ///             .fetch_one(&mut *conn)
    ///             .await
    ///             .map_err(DbError::from)?;
    ///         Ok::<_, DbError>(n)
    ///     }))
    ///     .await?;
    /// ```
    pub async fn transaction<T, E, F>(&self, body: F) -> Result<T, E>
    where
        F: for<'c> FnOnce(&'c mut SqliteConnection) -> TxFuture<'c, T, E>,
        E: From<DbError>,
    {
        let mut tx = WriteTransaction::begin(&self.pool).await?;

        let outcome = body(tx.connection()?).await;

        match outcome {
            Ok(value) => {
                tx.finish("COMMIT").await?;
                debug!("Transaction committed");
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.finish("ROLLBACK").await {
                    warn!(error = %rollback_err, "Rollback failed, connection discarded");
                } else {
                    warn!("Transaction rolled back");
                }
                Err(err)
            }
        }
    }

    /// Returns the client repository.
    pub fn clients(&self) -> ClientRepository {
        ClientRepository::new(self.pool.clone())
    }

    /// Returns the product repository.
    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone())
    }

    /// Returns the seller repository.
    pub fn sellers(&self) -> SellerRepository {
        SellerRepository::new(self.pool.clone())
    }

    /// Returns the sale repository.
    pub fn sales(&self) -> SaleRepository {
        SaleRepository::new(self.pool.clone())
    }

    /// Returns the shipment repository.
    pub fn shipments(&self) -> ShipmentRepository {
        ShipmentRepository::new(self.pool.clone())
    }

    /// Closes the database connection pool.
    ///
    /// After calling close, all operations will fail.
    pub async fn close(&self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }

    /// Checks if the database is healthy (can execute queries).
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Write Transaction Guard
// =============================================================================

/// A pooled connection with an open `BEGIN IMMEDIATE` transaction.
struct WriteTransaction {
    conn: Option<PoolConnection<Sqlite>>,
}

impl WriteTransaction {
    async fn begin(pool: &SqlitePool) -> DbResult<Self> {
        let mut conn = pool.acquire().await?;
        sqlx::query("BEGIN IMMEDIATE").execute(&mut *conn).await?;
        Ok(WriteTransaction { conn: Some(conn) })
    }

    fn connection(&mut self) -> DbResult<&mut SqliteConnection> {
        self.conn
            .as_deref_mut()
            .ok_or_else(|| DbError::TransactionFailed("transaction already finished".to_string()))
    }

    /// Runs COMMIT or ROLLBACK and releases the connection.
    async fn finish(&mut self, statement: &'static str) -> DbResult<()> {
        let Some(mut conn) = self.conn.take() else {
            return Ok(());
        };

        match sqlx::query(statement).execute(&mut *conn).await {
            Ok(_) => Ok(()),
            Err(err) => {
                // Unknown transaction state: never hand this connection out again.
                drop(conn.detach());
                match DbError::from(err) {
                    busy @ DbError::Busy(_) => Err(busy),
                    other => Err(DbError::TransactionFailed(other.to_string())),
                }
            }
        }
    }
}

impl Drop for WriteTransaction {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            warn!("Transaction dropped before completion, closing its connection");
            drop(conn.detach());
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    async fn count_sellers(db: &Database) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM Seller")
            .fetch_one(db.pool())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_in_memory_database() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        assert!(db.health_check().await);

        let (total, applied) = migrations::migration_status(db.pool()).await.unwrap();
        assert_eq!(total, applied);
    }

    #[tokio::test]
    async fn test_config_builder() {
        let config = DbConfig::new("/tmp/test.db")
            .max_connections(10)
            .min_connections(2)
            .busy_timeout(Duration::from_millis(250));

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 2);
        assert_eq!(config.busy_timeout, Duration::from_millis(250));
        assert!(!config.is_in_memory());
        assert!(DbConfig::in_memory().is_in_memory());
    }

    #[tokio::test]
    async fn test_transaction_commits_on_ok() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let id = db
            .transaction(|conn| {
                Box::pin(async move {
                    let result = sqlx::query("INSERT INTO Seller (Name) VALUES ('Ann')")
                        .execute(&mut *conn)
                        .await?;
                    Ok::<_, DbError>(result.last_insert_rowid())
                })
            })
            .await
            .unwrap();

        assert!(id > 0);
        assert_eq!(count_sellers(&db).await, 1);
    }

    #[tokio::test]
    async fn test_transaction_rolls_back_on_err() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let result: DbResult<()> = db
            .transaction(|conn| {
                Box::pin(async move {
                    sqlx::query("INSERT INTO Seller (Name) VALUES ('Ann')")
                        .execute(&mut *conn)
                        .await?;
                    Err(DbError::not_found("Client", 7))
                })
            })
            .await;

        assert!(matches!(result, Err(DbError::NotFound { .. })));
        assert_eq!(count_sellers(&db).await, 0);

        // The connection is usable again after the rollback.
        assert!(db.health_check().await);
    }
}
