//! # Validation Module
//!
//! Input validation and text parsing for Stockkeep.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: UI collaborator                                              │
//! │  └── parse_quantity / parse_money / parse_date on raw text             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Engine operation (before the transaction opens)              │
//! │  └── validate_new_sale / validate_new_shipment / validate_name ...     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (AmountLeft >= 0), CHECK (Quantity > 0)                     │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stockkeep_core::validation::{parse_money, parse_quantity};
//!
//! assert_eq!(parse_quantity("12").unwrap(), 12);
//! assert_eq!(parse_money("2.5").unwrap().cents(), 250);
//! assert!(parse_quantity("twelve").is_err());
//! ```

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{NewSale, NewShipment, SaleLine, ShipmentExpenses, ShipmentLine};
use crate::{MAX_AMOUNT, MAX_LINES_PER_OPERATION, MAX_NAME_LEN, MAX_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Date format used for every stored and parsed date.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// =============================================================================
// Text Parsers
// =============================================================================

/// Parses a whole, strictly positive quantity.
///
/// ## Example
/// ```rust
/// use stockkeep_core::validation::parse_quantity;
///
/// assert_eq!(parse_quantity(" 5 ").unwrap(), 5);
/// assert!(parse_quantity("0").is_err());
/// assert!(parse_quantity("2.5").is_err());
/// ```
pub fn parse_quantity(input: &str) -> ValidationResult<i64> {
    let qty: i64 = input
        .trim()
        .parse()
        .map_err(|_| ValidationError::InvalidFormat {
            field: "quantity".to_string(),
            reason: "must be a whole number".to_string(),
        })?;
    validate_quantity(qty)?;
    Ok(qty)
}

/// Parses a non-negative decimal amount with at most two fraction digits.
///
/// ## Rules
/// - `"5"`, `"5.0"`, `"5.05"` are accepted
/// - signs, exponents, thousands separators and a third decimal are rejected
pub fn parse_money(input: &str) -> ValidationResult<Money> {
    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: "amount".to_string(),
        reason: reason.to_string(),
    };

    let text = input.trim();
    if text.is_empty() {
        return Err(ValidationError::Required {
            field: "amount".to_string(),
        });
    }

    let (major_text, minor_text) = match text.split_once('.') {
        Some((major, minor)) => (major, minor),
        None => (text, ""),
    };

    if major_text.is_empty() || !major_text.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid("must be a non-negative number"));
    }
    if minor_text.len() > 2 || !minor_text.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid("at most two decimal places"));
    }

    let major: i64 = major_text
        .parse()
        .map_err(|_| invalid("amount is too large"))?;
    let minor: i64 = match minor_text.len() {
        0 => 0,
        1 => minor_text.parse::<i64>().map_err(|_| invalid("bad decimals"))? * 10,
        _ => minor_text.parse().map_err(|_| invalid("bad decimals"))?,
    };

    major
        .checked_mul(100)
        .and_then(|cents| cents.checked_add(minor))
        .map(Money::from_cents)
        .ok_or_else(|| invalid("amount is too large"))
}

/// Parses an ISO-8601 calendar date (`YYYY-MM-DD`).
pub fn parse_date(input: &str) -> ValidationResult<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT).map_err(|e| {
        ValidationError::InvalidFormat {
            field: "date".to_string(),
            reason: e.to_string(),
        }
    })
}

// =============================================================================
// Field Validators
// =============================================================================

/// Validates a display name and returns it trimmed.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most [`MAX_NAME_LEN`] characters
pub fn validate_name(field: &str, value: &str) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(value.to_string())
}

/// Validates a line quantity: 1..=[`MAX_QUANTITY`].
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    if qty > MAX_QUANTITY {
        return Err(ValidationError::QuantityTooLarge {
            requested: qty,
            max: MAX_QUANTITY,
        });
    }
    Ok(())
}

/// Validates a stock level or purchase count: must be ≥ 0.
pub fn validate_count(field: &str, value: i64) -> ValidationResult<()> {
    if value < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a price, rate or expense: 0..=[`MAX_AMOUNT`].
pub fn validate_amount(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    if amount > MAX_AMOUNT {
        return Err(ValidationError::TooLarge {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates the three shipment expenses.
pub fn validate_expenses(expenses: &ShipmentExpenses) -> ValidationResult<()> {
    validate_amount("delivery expense", expenses.delivery)?;
    validate_amount("equipment expense", expenses.equipment)?;
    validate_amount("employee expense", expenses.employee)?;
    Ok(())
}

fn validate_line_count(field: &str, count: usize) -> ValidationResult<()> {
    if count == 0 || count > MAX_LINES_PER_OPERATION {
        return Err(ValidationError::Count {
            field: field.to_string(),
            min: 1,
            max: MAX_LINES_PER_OPERATION,
        });
    }
    Ok(())
}

// =============================================================================
// Operation Validators
// =============================================================================

/// Validates the lines of a new sale.
pub fn validate_sale_lines(lines: &[SaleLine]) -> ValidationResult<()> {
    validate_line_count("sale items", lines.len())?;
    for line in lines {
        validate_quantity(line.quantity)?;
    }
    Ok(())
}

/// Validates a new sale before its transaction opens.
pub fn validate_new_sale(sale: &NewSale) -> ValidationResult<()> {
    validate_sale_lines(&sale.lines)
}

/// Validates the lines of a new shipment.
pub fn validate_shipment_lines(lines: &[ShipmentLine]) -> ValidationResult<()> {
    validate_line_count("shipment items", lines.len())?;
    for line in lines {
        validate_quantity(line.quantity)?;
        validate_amount("rate", line.rate)?;
    }
    Ok(())
}

/// Validates a new shipment and returns the trimmed deliveryman name.
pub fn validate_new_shipment(shipment: &NewShipment) -> ValidationResult<String> {
    let deliveryman = validate_name("deliveryman", &shipment.deliveryman)?;
    validate_expenses(&shipment.expenses)?;
    validate_shipment_lines(&shipment.lines)?;
    Ok(deliveryman)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PaymentStatus;

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("1").unwrap(), 1);
        assert_eq!(parse_quantity(" 999 ").unwrap(), 999);

        assert!(parse_quantity("").is_err());
        assert!(parse_quantity("0").is_err());
        assert!(parse_quantity("-3").is_err());
        assert!(parse_quantity("1.5").is_err());
        assert!(parse_quantity("abc").is_err());

        assert_eq!(parse_quantity("1000000").unwrap(), MAX_QUANTITY);
        assert!(matches!(
            parse_quantity("1000001"),
            Err(ValidationError::QuantityTooLarge { requested: 1_000_001, .. })
        ));
        assert!(matches!(
            parse_quantity(&(i64::MAX / 100).to_string()),
            Err(ValidationError::QuantityTooLarge { .. })
        ));
    }

    #[test]
    fn test_validate_amount_bounds() {
        assert!(validate_amount("price", Money::zero()).is_ok());
        assert!(validate_amount("price", MAX_AMOUNT).is_ok());
        assert!(matches!(
            validate_amount("price", Money::from_cents(MAX_AMOUNT.cents() + 1)),
            Err(ValidationError::TooLarge { .. })
        ));
        assert!(matches!(
            validate_amount("rate", Money::from_cents(-1)),
            Err(ValidationError::MustNotBeNegative { .. })
        ));
    }

    #[test]
    fn test_parse_money() {
        assert_eq!(parse_money("5").unwrap().cents(), 500);
        assert_eq!(parse_money("5.0").unwrap().cents(), 500);
        assert_eq!(parse_money("2.5").unwrap().cents(), 250);
        assert_eq!(parse_money("0.05").unwrap().cents(), 5);
        assert_eq!(parse_money(" 10.99 ").unwrap().cents(), 1099);

        assert!(parse_money("").is_err());
        assert!(parse_money("-1").is_err());
        assert!(parse_money("1.234").is_err());
        assert!(parse_money("1e3").is_err());
        assert!(parse_money(".5").is_err());
        assert!(parse_money("1,000").is_err());
        assert!(parse_money("99999999999999999999").is_err());
    }

    #[test]
    fn test_parse_date() {
        let date = parse_date("2024-02-29").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert!(parse_date("2023-02-29").is_err());
        assert!(parse_date("29/02/2024").is_err());
    }

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("name", "  Alice ").unwrap(), "Alice");
        assert!(validate_name("name", "   ").is_err());
        assert!(validate_name("name", &"A".repeat(MAX_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn test_validate_new_sale() {
        let mut sale = NewSale {
            client_id: 1,
            seller_id: 1,
            payment_status: PaymentStatus::Paid,
            sale_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            lines: vec![],
        };
        assert!(matches!(
            validate_new_sale(&sale),
            Err(ValidationError::Count { .. })
        ));

        sale.lines = vec![SaleLine { product_id: 1, quantity: 0 }];
        assert!(matches!(
            validate_new_sale(&sale),
            Err(ValidationError::MustBePositive { .. })
        ));

        sale.lines = vec![SaleLine { product_id: 1, quantity: 3 }];
        assert!(validate_new_sale(&sale).is_ok());
    }

    #[test]
    fn test_validate_new_shipment() {
        let mut shipment = NewShipment {
            deliveryman: " Dave ".to_string(),
            delivery_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            expenses: ShipmentExpenses::default(),
            lines: vec![ShipmentLine {
                product_id: 1,
                quantity: 10,
                rate: Money::from_cents(200),
            }],
        };
        assert_eq!(validate_new_shipment(&shipment).unwrap(), "Dave");

        shipment.expenses.employee = Money::from_cents(-1);
        assert!(validate_new_shipment(&shipment).is_err());

        shipment.expenses.employee = Money::zero();
        shipment.lines[0].rate = Money::from_cents(-5);
        assert!(validate_new_shipment(&shipment).is_err());

        shipment.lines.clear();
        assert!(validate_new_shipment(&shipment).is_err());

        shipment.deliveryman = String::new();
        assert!(matches!(
            validate_new_shipment(&shipment),
            Err(ValidationError::Required { .. })
        ));
    }
}
