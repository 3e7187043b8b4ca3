//! # Repository Module
//!
//! Statements per table, in two flavours.
//!
//! ## Reads vs Transactional Statements
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Query views                          Engine operations                 │
//! │       │                                     │                           │
//! │       │  db.sales().list()                  │  db.transaction(|conn| {  │
//! │       ▼                                     │      sale::insert(conn,..)│
//! │  SaleRepository (owns a pool clone)         │      product::take_stock( │
//! │  ├── list(&self)                            │  })                       │
//! │  └── get(&self, id)                         ▼                           │
//! │       │                              free functions taking              │
//! │       │                              `&mut SqliteConnection`            │
//! │       │                                     │                           │
//! │       └──────────────┬──────────────────────┘                           │
//! │                      ▼                                                  │
//! │               SQLite Database                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Repository structs serve fresh reads outside any transaction. The free
//! functions of each module run on the caller's transaction connection, so
//! an operation composes statements from several tables atomically.
//!
//! ## Available Repositories
//!
//! - [`ClientRepository`](client::ClientRepository) - Clients and purchase counts
//! - [`ProductRepository`](product::ProductRepository) - Products and stock
//! - [`SellerRepository`](seller::SellerRepository) - Sellers and cash on hand
//! - [`SaleRepository`](sale::SaleRepository) - Sale rows and joined listings
//! - [`ShipmentRepository`](shipment::ShipmentRepository) - Shipments and their items

pub mod client;
pub mod product;
pub mod sale;
pub mod seller;
pub mod shipment;
