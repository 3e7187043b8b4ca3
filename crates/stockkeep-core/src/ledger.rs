//! # Ledger Rules
//!
//! The arithmetic behind every ledger movement, kept free of I/O so the
//! transaction managers only sequence statements.
//!
//! ## Ledgers and Their Movements
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Ledger              create_sale   set_paid   delete_sale   shipment    │
//! │  ──────────────────  ───────────   ────────   ───────────   ────────    │
//! │  Product stock        - qty          .         + qty        + qty       │
//! │  Client purchases     + qty          .         - qty (≥0)     .         │
//! │  Seller cash          + rev if Paid  ± rev     - rev if Paid  .         │
//! │  Shipment revenue       .            .           .          Σ p×q       │
//! │  Shipment profit        .            .           .          Σ(p-r)q - E │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{PaymentStatus, ProductId, Sale, SellerId, ShipmentExpenses};

// =============================================================================
// Sales
// =============================================================================

fn too_large(field: &str) -> CoreError {
    ValidationError::TooLarge {
        field: field.to_string(),
    }
    .into()
}

/// Revenue of one sale line: unit price × quantity.
#[inline]
pub fn line_revenue(unit_price: Money, quantity: i64) -> CoreResult<Money> {
    unit_price
        .checked_multiply_quantity(quantity)
        .ok_or_else(|| too_large("revenue"))
}

/// Adds a line's revenue to a running total.
#[inline]
pub fn add_revenue(total: Money, revenue: Money) -> CoreResult<Money> {
    total.checked_add(revenue).ok_or_else(|| too_large("revenue"))
}

/// Verifies that `requested` units can be taken from `available`.
///
/// ## Example
/// ```rust
/// use stockkeep_core::ledger::check_stock;
///
/// assert!(check_stock(7, 10, 10).is_ok());
/// assert!(check_stock(7, 10, 11).is_err());
/// ```
pub fn check_stock(product_id: ProductId, available: i64, requested: i64) -> CoreResult<()> {
    if requested > available {
        return Err(CoreError::InsufficientStock {
            product_id,
            available,
            requested,
        });
    }
    Ok(())
}

/// Cash moved onto the seller when a sale goes from `previous` to `next`.
///
/// Paid → Unpaid gives back the revenue, Unpaid → Paid collects it, and a
/// transition to the same status moves nothing.
pub fn payment_cash_delta(previous: PaymentStatus, next: PaymentStatus, revenue: Money) -> Money {
    match (previous, next) {
        (PaymentStatus::Unpaid, PaymentStatus::Paid) => revenue,
        (PaymentStatus::Paid, PaymentStatus::Unpaid) => -revenue,
        _ => Money::zero(),
    }
}

/// Cash the seller gives back when a sale is reversed.
pub fn reversal_cash_delta(status: PaymentStatus, revenue: Money) -> Money {
    if status.is_paid() {
        -revenue
    } else {
        Money::zero()
    }
}

/// Purchase count after removing `quantity`, floored at zero.
#[inline]
pub fn floored_purchase_count(current: i64, quantity: i64) -> i64 {
    (current - quantity).max(0)
}

// =============================================================================
// Sale Amendments
// =============================================================================

/// Ledger movements implied by rewriting a sale's quantity and seller.
///
/// Used by the rebalancing amendment policy. The unit price stays frozen at
/// `total_revenue / quantity` of the original row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmendmentPlan {
    /// Units returned to stock (negative: units taken from stock).
    pub stock_delta: i64,
    /// Change of the client's purchase count.
    pub purchase_delta: i64,
    /// New frozen revenue of the row.
    pub new_revenue: Money,
    /// Cash removed from the original seller (zero when Unpaid).
    pub cash_out: Option<(SellerId, Money)>,
    /// Cash added to the (possibly new) seller (zero when Unpaid).
    pub cash_in: Option<(SellerId, Money)>,
}

impl AmendmentPlan {
    /// Computes the plan for `sale` amended to `new_quantity` and `new_seller`.
    pub fn compute(sale: &Sale, new_quantity: i64, new_seller: SellerId) -> CoreResult<Self> {
        let unit_price = sale.total_revenue.per_unit(sale.quantity).unwrap_or_default();
        let new_revenue = line_revenue(unit_price, new_quantity)?;

        let (cash_out, cash_in) = if sale.payment_status.is_paid() {
            (
                Some((sale.seller_id, sale.total_revenue)),
                Some((new_seller, new_revenue)),
            )
        } else {
            (None, None)
        };

        Ok(AmendmentPlan {
            stock_delta: sale.quantity - new_quantity,
            purchase_delta: new_quantity - sale.quantity,
            new_revenue,
            cash_out,
            cash_in,
        })
    }
}

// =============================================================================
// Shipments
// =============================================================================

/// Revenue and gross profit of a shipment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShipmentTotals {
    pub revenue: Money,
    pub gross_profit: Money,
}

/// Accumulates shipment lines as they are written.
///
/// ## Formula
/// ```text
/// revenue      = Σ price × qty
/// gross_profit = Σ (price − rate) × qty − (delivery + equipment + employee)
/// ```
#[derive(Debug, Clone, Default)]
pub struct ShipmentTally {
    revenue: Money,
    margin: Money,
    lines: usize,
}

impl ShipmentTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one received line priced at the product's current sale price.
    ///
    /// Returns the line cost (qty × rate) to store on the item. On overflow
    /// the tally is left as it was.
    pub fn add_item(
        &mut self,
        sale_price: Money,
        rate: Money,
        quantity: i64,
    ) -> CoreResult<Money> {
        let revenue = sale_price
            .checked_multiply_quantity(quantity)
            .and_then(|line| self.revenue.checked_add(line))
            .ok_or_else(|| too_large("shipment revenue"))?;
        let margin = sale_price
            .checked_sub(rate)
            .and_then(|unit| unit.checked_multiply_quantity(quantity))
            .and_then(|line| self.margin.checked_add(line))
            .ok_or_else(|| too_large("shipment profit"))?;
        let cost = rate
            .checked_multiply_quantity(quantity)
            .ok_or_else(|| too_large("shipment cost"))?;

        self.revenue = revenue;
        self.margin = margin;
        self.lines += 1;
        Ok(cost)
    }

    /// Number of lines added so far.
    pub fn lines(&self) -> usize {
        self.lines
    }

    /// Applies the expenses and returns the final totals.
    pub fn finish(&self, expenses: &ShipmentExpenses) -> CoreResult<ShipmentTotals> {
        let gross_profit = self
            .margin
            .checked_sub(expenses.total())
            .ok_or_else(|| too_large("shipment profit"))?;
        Ok(ShipmentTotals {
            revenue: self.revenue,
            gross_profit,
        })
    }
}

/// Gross profit after the shipment's expenses are edited.
///
/// The item margin computed at creation is kept; only the expense part moves.
pub fn profit_after_expense_change(
    gross_profit: Money,
    old_expenses: &ShipmentExpenses,
    new_expenses: &ShipmentExpenses,
) -> CoreResult<Money> {
    gross_profit
        .checked_add(old_expenses.total())
        .and_then(|profit| profit.checked_sub(new_expenses.total()))
        .ok_or_else(|| too_large("shipment profit"))
}
