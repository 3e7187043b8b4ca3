//! # Domain Types
//!
//! Core domain types used throughout Stockkeep.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Client      │   │     Product     │   │     Seller      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  purchase_count │   │  stock_on_hand  │   │  cash_on_hand   │       │
//! │  └────────┬────────┘   └───┬─────────┬───┘   └────────┬────────┘       │
//! │           │                │         │                │                 │
//! │           └──────┐   ┌─────┘         └─────┐   ┌──────┘                 │
//! │                  ▼   ▼                     ▼   │                        │
//! │           ┌─────────────────┐   ┌─────────────────┐                     │
//! │           │      Sale       │   │  ShipmentItem   │──► Shipment         │
//! │           │  one line each  │   │  qty × rate     │    revenue, profit  │
//! │           └─────────────────┘   └─────────────────┘                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Every entity is keyed by a store-assigned integer id. Sale and delivery
//! dates are calendar dates; monetary fields are [`Money`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::money::Money;

/// Client identifier.
pub type ClientId = i64;
/// Product identifier.
pub type ProductId = i64;
/// Seller identifier.
pub type SellerId = i64;
/// Sale identifier.
pub type SaleId = i64;
/// Shipment identifier.
pub type ShipmentId = i64;

// =============================================================================
// Payment Status
// =============================================================================

/// Whether a sale's revenue has been collected by its seller.
///
/// Stored as the text `Paid` / `Unpaid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
pub enum PaymentStatus {
    Paid,
    Unpaid,
}

impl PaymentStatus {
    /// Returns the stored/display label.
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Paid => "Paid",
            PaymentStatus::Unpaid => "Unpaid",
        }
    }

    /// Returns the opposite status.
    pub const fn toggled(&self) -> Self {
        match self {
            PaymentStatus::Paid => PaymentStatus::Unpaid,
            PaymentStatus::Unpaid => PaymentStatus::Paid,
        }
    }

    #[inline]
    pub const fn is_paid(&self) -> bool {
        matches!(self, PaymentStatus::Paid)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "paid" => Ok(PaymentStatus::Paid),
            "unpaid" => Ok(PaymentStatus::Unpaid),
            _ => Err(ValidationError::InvalidFormat {
                field: "payment status".to_string(),
                reason: format!("expected Paid or Unpaid, got '{}'", s.trim()),
            }),
        }
    }
}

// =============================================================================
// Entities
// =============================================================================

/// A customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Client {
    pub id: ClientId,
    pub name: String,
    /// Free-text preference tag (usually a product name).
    pub preferences: String,
    /// Sum of quantities over this client's surviving sales.
    pub purchase_count: i64,
}

/// A product kept in stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Units available for sale. Never negative.
    pub stock_on_hand: i64,
    /// Sale price per unit.
    pub unit_price: Money,
    /// Cost basis per unit ("rate").
    pub unit_cost: Money,
}

impl Product {
    /// Checks whether `quantity` units can be sold right now.
    pub fn can_sell(&self, quantity: i64) -> bool {
        quantity <= self.stock_on_hand
    }
}

/// A salesperson holding collected cash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Seller {
    pub id: SellerId,
    pub name: String,
    pub cash_on_hand: Money,
}

/// One sale line: exactly one product sold to one client by one seller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: SaleId,
    pub client_id: ClientId,
    pub product_id: ProductId,
    pub seller_id: SellerId,
    pub quantity: i64,
    pub sale_date: NaiveDate,
    pub payment_status: PaymentStatus,
    /// quantity × unit price at sale time (frozen).
    pub total_revenue: Money,
}

/// Operational expenses charged against a shipment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentExpenses {
    pub delivery: Money,
    pub equipment: Money,
    pub employee: Money,
}

impl ShipmentExpenses {
    pub const fn new(delivery: Money, equipment: Money, employee: Money) -> Self {
        ShipmentExpenses {
            delivery,
            equipment,
            employee,
        }
    }

    /// Sum of the three expense fields.
    pub fn total(&self) -> Money {
        self.delivery + self.equipment + self.employee
    }
}

/// A received delivery that restocks products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Shipment {
    pub id: ShipmentId,
    pub deliveryman: String,
    pub delivery_date: NaiveDate,
    pub delivery_expense: Money,
    pub equipment_expense: Money,
    pub employee_expense: Money,
    /// Σ price × qty, priced at creation time.
    pub revenue: Money,
    /// Σ (price − rate) × qty − expenses, priced at creation time.
    pub gross_profit: Money,
}

impl Shipment {
    pub fn expenses(&self) -> ShipmentExpenses {
        ShipmentExpenses::new(
            self.delivery_expense,
            self.equipment_expense,
            self.employee_expense,
        )
    }
}

/// One product line of a shipment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ShipmentItem {
    pub id: i64,
    pub shipment_id: ShipmentId,
    pub product_id: ProductId,
    pub quantity_received: i64,
    /// Cost per unit at receipt time.
    pub rate: Money,
    /// quantity_received × rate.
    pub cost: Money,
}

// =============================================================================
// Operation Inputs
// =============================================================================

/// One requested line of a new sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleLine {
    pub product_id: ProductId,
    pub quantity: i64,
}

/// A (possibly multi-product) customer sale.
///
/// Each line becomes one [`Sale`] row sharing client, seller, date and status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSale {
    pub client_id: ClientId,
    pub seller_id: SellerId,
    pub payment_status: PaymentStatus,
    pub sale_date: NaiveDate,
    pub lines: Vec<SaleLine>,
}

/// New values for an existing sale row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleAmendment {
    pub quantity: i64,
    /// Seller resolved by exact name.
    pub seller_name: String,
    pub sale_date: NaiveDate,
}

/// One requested line of a new shipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentLine {
    pub product_id: ProductId,
    pub quantity: i64,
    pub rate: Money,
}

/// A delivery to record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewShipment {
    pub deliveryman: String,
    pub delivery_date: NaiveDate,
    pub expenses: ShipmentExpenses,
    pub lines: Vec<ShipmentLine>,
}

/// Editable header fields of a shipment. Lines are immutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentEdit {
    pub deliveryman: String,
    pub delivery_date: NaiveDate,
    pub expenses: ShipmentExpenses,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewClient {
    pub name: String,
    pub preferences: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientUpdate {
    pub name: String,
    pub preferences: String,
    pub purchase_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub unit_price: Money,
    pub unit_cost: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: String,
    pub stock_on_hand: i64,
    pub unit_price: Money,
    pub unit_cost: Money,
}

// =============================================================================
// Policies & Filters
// =============================================================================

/// How `amend_sale` treats the ledgers when a sale row is rewritten.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmendPolicy {
    /// Only the sale row changes. Stock, purchase count, revenue and cash
    /// keep their previous values.
    #[default]
    RecordOnly,
    /// Quantity and seller changes are carried into stock, purchase count,
    /// the frozen revenue and the sellers' cash.
    Rebalance,
}

impl FromStr for AmendPolicy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "record_only" | "record" => Ok(AmendPolicy::RecordOnly),
            "rebalance" => Ok(AmendPolicy::Rebalance),
            _ => Err(ValidationError::InvalidFormat {
                field: "amend policy".to_string(),
                reason: format!("expected record_only or rebalance, got '{}'", s.trim()),
            }),
        }
    }
}

/// Ordering of the shipment listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentSort {
    /// Insertion order.
    #[default]
    All,
    NewestFirst,
    OldestFirst,
}

/// Shipment listing filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentFilter {
    /// Only shipments containing a product with exactly this name.
    pub product_name: Option<String>,
    pub sort: ShipmentSort,
}

// =============================================================================
// Views
// =============================================================================

/// A sale row joined with display names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleListing {
    pub id: SaleId,
    pub client_name: String,
    pub product_name: String,
    pub quantity: i64,
    pub sale_date: NaiveDate,
    pub payment_status: PaymentStatus,
    pub seller_name: String,
    pub total_revenue: Money,
}

/// Shipment header as shown in the listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ShipmentSummary {
    pub id: ShipmentId,
    pub deliveryman: String,
    pub delivery_date: NaiveDate,
    pub gross_profit: Money,
    pub revenue: Money,
}

/// A shipment line joined with its product name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ShipmentItemLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity_received: i64,
    pub rate: Money,
    pub cost: Money,
}

/// Full shipment: header, expenses and lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentDetail {
    pub shipment: Shipment,
    pub items: Vec<ShipmentItemLine>,
}

/// Cash position of one seller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SellerCash {
    pub seller_id: SellerId,
    pub name: String,
    pub cash_on_hand: Money,
    /// Σ total revenue over the seller's Paid and Unpaid sales.
    pub recognized_revenue: Money,
}

/// Cash position of every seller plus grand totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashSummary {
    pub sellers: Vec<SellerCash>,
    pub total_cash_on_hand: Money,
    pub total_recognized_revenue: Money,
}

impl CashSummary {
    /// Builds the summary and its grand totals from per-seller rows.
    pub fn from_sellers(sellers: Vec<SellerCash>) -> Self {
        let total_cash_on_hand = sellers.iter().map(|s| s.cash_on_hand).sum();
        let total_recognized_revenue = sellers.iter().map(|s| s.recognized_revenue).sum();
        CashSummary {
            sellers,
            total_cash_on_hand,
            total_recognized_revenue,
        }
    }

    /// Looks up one seller's row by name.
    pub fn seller(&self, name: &str) -> Option<&SellerCash> {
        self.sellers.iter().find(|s| s.name == name)
    }
}

// =============================================================================
// Operation Outcomes
// =============================================================================

/// Result of a committed multi-line sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleReceipt {
    /// Created sale ids, in line order.
    pub sale_ids: Vec<SaleId>,
    pub total_revenue: Money,
}

/// Result of a payment-status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentChange {
    pub sale_id: SaleId,
    pub previous: PaymentStatus,
    pub current: PaymentStatus,
    /// Amount applied to the seller's cash (zero when unchanged).
    pub cash_delta: Money,
}

impl PaymentChange {
    pub fn is_unchanged(&self) -> bool {
        self.previous == self.current
    }
}

/// Result of a committed shipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentReceipt {
    pub shipment_id: ShipmentId,
    pub revenue: Money,
    pub gross_profit: Money,
}

/// Rows touched by a cash reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetReport {
    pub sellers_reset: u64,
    pub sales_zeroed: u64,
}
