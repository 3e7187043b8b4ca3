//! # Demo Data Seeder
//!
//! Fills a database with a small, consistent ledger for development.
//!
//! ## Usage
//! ```bash
//! # Seed the default data file
//! cargo run -p stockkeep-engine --bin seed
//!
//! # Specify database path
//! cargo run -p stockkeep-engine --bin seed -- --db ./data/stockkeep.db
//!
//! # Read settings from a config file
//! cargo run -p stockkeep-engine --bin seed -- --config ./stockkeep.toml
//! ```
//!
//! ## What Gets Created
//! - Three sellers and four clients
//! - Six products, restocked by one shipment
//! - A handful of paid and unpaid sales
//!
//! Everything goes through the engine, so the ledgers stay consistent. The
//! final cash summary is printed as JSON.

use chrono::{Duration, Local};
use std::env;
use std::path::PathBuf;

use stockkeep_core::{
    Money, NewClient, NewProduct, NewSale, NewShipment, PaymentStatus, SaleLine, ShipmentExpenses,
    ShipmentLine,
};
use stockkeep_engine::{telemetry, Engine, EngineConfig};

/// Sellers.
const SELLERS: &[&str] = &["Amira", "Bruno", "Chen"];

/// Clients and their preferred product.
const CLIENTS: &[(&str, &str)] = &[
    ("Dana Whitfield", "Espresso Beans"),
    ("Eli Novak", "Green Tea"),
    ("Farah Qureshi", "Oat Milk"),
    ("Gus Lindqvist", "Dark Chocolate"),
];

/// Products: name, price cents, rate (cost) cents, units received.
const PRODUCTS: &[(&str, i64, i64, i64)] = &[
    ("Espresso Beans", 1299, 780, 40),
    ("Green Tea", 649, 310, 60),
    ("Oat Milk", 399, 220, 48),
    ("Dark Chocolate", 299, 140, 80),
    ("Honey Jar", 899, 500, 24),
    ("Rice Crackers", 249, 120, 50),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path: Option<PathBuf> = None;
    let mut config_path: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Stockkeep Demo Data Seeder");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>      Database file path (default: platform data dir)");
                println!("  -c, --config <PATH>  Config file (default: platform config dir)");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let mut config = EngineConfig::load(config_path)?;
    if let Some(path) = db_path {
        config.database.path = path;
    }
    telemetry::init_tracing(&config.logging.filter);

    println!("Stockkeep Demo Data Seeder");
    println!("==========================");
    println!("Database: {}", config.database.path.display());
    println!();

    let engine = Engine::open(&config).await?;
    println!("✓ Connected to database (amend policy: {:?})", engine.amend_policy());

    let existing = engine.queries().list_sellers().await?;
    if !existing.is_empty() {
        println!("⚠ Database already has {} sellers", existing.len());
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        engine.close().await;
        return Ok(());
    }

    let catalog = engine.catalog();

    let mut sellers = Vec::with_capacity(SELLERS.len());
    for name in SELLERS {
        sellers.push(catalog.add_seller(name).await?);
    }

    let mut clients = Vec::with_capacity(CLIENTS.len());
    for (name, preferences) in CLIENTS {
        let id = catalog
            .add_client(NewClient {
                name: name.to_string(),
                preferences: preferences.to_string(),
            })
            .await?;
        clients.push(id);
    }

    let mut products = Vec::with_capacity(PRODUCTS.len());
    for (name, price, rate, _) in PRODUCTS {
        let id = catalog
            .add_product(NewProduct {
                name: name.to_string(),
                unit_price: Money::from_cents(*price),
                unit_cost: Money::from_cents(*rate),
            })
            .await?;
        products.push(id);
    }
    println!(
        "✓ Added {} sellers, {} clients, {} products",
        sellers.len(),
        clients.len(),
        products.len()
    );

    let today = Local::now().date_naive();

    let receipt = engine
        .shipments()
        .create_shipment(NewShipment {
            deliveryman: "Northside Freight".to_string(),
            delivery_date: today - Duration::days(7),
            expenses: ShipmentExpenses::new(
                Money::from_cents(4500),
                Money::from_cents(1200),
                Money::from_cents(3000),
            ),
            lines: products
                .iter()
                .zip(PRODUCTS)
                .map(|(&product_id, &(_, _, rate, units))| ShipmentLine {
                    product_id,
                    quantity: units,
                    rate: Money::from_cents(rate),
                })
                .collect(),
        })
        .await?;
    println!(
        "✓ Shipment {} received: revenue {}, gross profit {}",
        receipt.shipment_id, receipt.revenue, receipt.gross_profit
    );

    let mut sold = 0;
    for (n, &client_id) in clients.iter().enumerate() {
        let status = if n % 2 == 0 {
            PaymentStatus::Paid
        } else {
            PaymentStatus::Unpaid
        };
        let first = products[n % products.len()];
        let second = products[(n + 3) % products.len()];

        engine
            .sales()
            .create_sale(NewSale {
                client_id,
                seller_id: sellers[n % sellers.len()],
                payment_status: status,
                sale_date: today - Duration::days(6 - n as i64),
                lines: vec![
                    SaleLine {
                        product_id: first,
                        quantity: 2 + n as i64,
                    },
                    SaleLine {
                        product_id: second,
                        quantity: 1,
                    },
                ],
            })
            .await?;
        sold += 1;
    }
    println!("✓ Recorded {} sales", sold);

    let summary = engine.queries().seller_cash_summary().await?;
    println!();
    println!("{}", serde_json::to_string_pretty(&summary)?);

    engine.close().await;
    println!();
    println!("✓ Seed complete!");

    Ok(())
}
