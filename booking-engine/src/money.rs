//! Money calculation utilities using rust_decimal for precision
//!
//! Prices are stored as `f64` for wire compatibility; every total is
//! computed through `Decimal` and rounded to 2 decimal places before
//! storage. Finiteness and bounds are validated at the checkout boundary.

use crate::bookings::{BookingError, BookingResult};
use rust_decimal::prelude::*;
use shared::booking::{CartItem, LineItem};

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Maximum allowed price per item
const MAX_PRICE: f64 = 1_000_000.0;
/// Maximum allowed quantity per item
const MAX_QUANTITY: i32 = 9999;

/// Validate that a f64 value is finite (not NaN, not Infinity)
#[inline]
fn require_finite(value: f64, field_name: &str) -> BookingResult<()> {
    if !value.is_finite() {
        return Err(BookingError::Validation(format!(
            "{} must be a finite number, got {}",
            field_name, value
        )));
    }
    Ok(())
}

/// Validate a cart item before it is frozen into a line item
pub fn validate_cart_item(item: &CartItem) -> BookingResult<()> {
    require_finite(item.service_price, "service_price")?;
    if item.service_price < 0.0 {
        return Err(BookingError::Validation(format!(
            "service_price must be non-negative, got {}",
            item.service_price
        )));
    }
    if item.service_price > MAX_PRICE {
        return Err(BookingError::Validation(format!(
            "service_price exceeds maximum allowed ({}), got {}",
            MAX_PRICE, item.service_price
        )));
    }

    if item.quantity <= 0 {
        return Err(BookingError::Validation(format!(
            "quantity must be positive, got {}",
            item.quantity
        )));
    }
    if item.quantity > MAX_QUANTITY {
        return Err(BookingError::Validation(format!(
            "quantity exceeds maximum allowed ({}), got {}",
            MAX_QUANTITY, item.quantity
        )));
    }

    Ok(())
}

/// Convert f64 to Decimal for calculation.
///
/// Inputs are pre-validated via `require_finite` at the boundary; a
/// non-finite value reaching here is logged and treated as zero rather
/// than corrupting a total.
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_else(|| {
        tracing::error!(value = ?value, "Non-finite f64 in monetary calculation, defaulting to zero");
        Decimal::ZERO
    })
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or(0.0)
}

/// Checkout snapshot: `Σ service_price × quantity` over the cart
pub fn cart_total(items: &[CartItem]) -> f64 {
    let total: Decimal = items
        .iter()
        .map(|i| to_decimal(i.service_price) * Decimal::from(i.quantity))
        .sum();
    to_f64(total)
}

/// Viewer-local subtotal over a set of line items (same formula as the
/// checkout snapshot, applied to a provider's own items)
pub fn items_total(items: &[LineItem]) -> f64 {
    let total: Decimal = items
        .iter()
        .map(|i| to_decimal(i.service_price) * Decimal::from(i.quantity))
        .sum();
    to_f64(total)
}
