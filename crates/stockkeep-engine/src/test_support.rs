//! Shared fixtures for engine tests.

use chrono::NaiveDate;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use stockkeep_core::{
    AmendPolicy, ClientId, ClientUpdate, Money, NewClient, NewProduct, ProductId, ProductUpdate,
    SellerId,
};
use stockkeep_db::{Database, DbConfig};

use crate::{Engine, EngineConfig};

/// A date in March 2024.
pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
}

/// Engine with one client (Carla), two sellers (Ann, Bob) and two products
/// (Apple at 5.00 / rate 2.00, Pear at 3.00 / rate 1.00), 10 units each.
pub struct Fixture {
    pub engine: Engine,
    pub client: ClientId,
    pub seller: SellerId,
    pub other_seller: SellerId,
    pub apple: ProductId,
    pub pear: ProductId,
    file: Option<PathBuf>,
}

impl Fixture {
    pub async fn new() -> Self {
        Self::with_policy(AmendPolicy::RecordOnly).await
    }

    pub async fn with_policy(policy: AmendPolicy) -> Self {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        Self::populate(Engine::with_database(db, policy), None).await
    }

    /// File-backed database in the temp dir, for tests needing several connections.
    pub async fn on_file(name: &str) -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let path = std::env::temp_dir().join(format!(
            "stockkeep-{}-{}-{}.db",
            name,
            std::process::id(),
            nanos
        ));

        let mut config = EngineConfig::default();
        config.database.path = path.clone();
        let engine = Engine::open(&config).await.unwrap();

        Self::populate(engine, Some(path)).await
    }

    async fn populate(engine: Engine, file: Option<PathBuf>) -> Self {
        let catalog = engine.catalog();

        let client = catalog
            .add_client(NewClient {
                name: "Carla".to_string(),
                preferences: "Apple".to_string(),
            })
            .await
            .unwrap();
        let seller = catalog.add_seller("Ann").await.unwrap();
        let other_seller = catalog.add_seller("Bob").await.unwrap();

        let apple = catalog
            .add_product(NewProduct {
                name: "Apple".to_string(),
                unit_price: Money::from_cents(500),
                unit_cost: Money::from_cents(200),
            })
            .await
            .unwrap();
        let pear = catalog
            .add_product(NewProduct {
                name: "Pear".to_string(),
                unit_price: Money::from_cents(300),
                unit_cost: Money::from_cents(100),
            })
            .await
            .unwrap();

        let fixture = Fixture {
            engine,
            client,
            seller,
            other_seller,
            apple,
            pear,
            file,
        };
        fixture.set_stock(apple, 10).await;
        fixture.set_stock(pear, 10).await;
        fixture
    }

    pub async fn stock(&self, product: ProductId) -> i64 {
        let db = self.engine.database();
        db.products().get(product).await.unwrap().unwrap().stock_on_hand
    }

    pub async fn purchases(&self, client: ClientId) -> i64 {
        let db = self.engine.database();
        db.clients().get(client).await.unwrap().unwrap().purchase_count
    }

    /// Seller cash in cents.
    pub async fn cash(&self, seller: SellerId) -> i64 {
        let db = self.engine.database();
        db.sellers().get(seller).await.unwrap().unwrap().cash_on_hand.cents()
    }

    pub async fn set_stock(&self, product: ProductId, units: i64) {
        let current = self
            .engine
            .database()
            .products()
            .get(product)
            .await
            .unwrap()
            .unwrap();

        self.engine
            .catalog()
            .edit_product(
                product,
                ProductUpdate {
                    name: current.name,
                    stock_on_hand: units,
                    unit_price: current.unit_price,
                    unit_cost: current.unit_cost,
                },
            )
            .await
            .unwrap();
    }

    pub async fn set_purchases(&self, client: ClientId, count: i64) {
        let current = self
            .engine
            .database()
            .clients()
            .get(client)
            .await
            .unwrap()
            .unwrap();

        self.engine
            .catalog()
            .edit_client(
                client,
                ClientUpdate {
                    name: current.name,
                    preferences: current.preferences,
                    purchase_count: count,
                },
            )
            .await
            .unwrap();
    }

    /// Closes the pool and removes a file-backed database.
    pub async fn cleanup(self) {
        self.engine.close().await;
        if let Some(path) = self.file {
            for suffix in ["", "-wal", "-shm"] {
                let mut file = path.clone().into_os_string();
                file.push(suffix);
                let _ = std::fs::remove_file(file);
            }
        }
    }
}
