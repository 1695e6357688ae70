//! Cart types for point-of-sale checkout
//!
//! A cart is a transient, unpersisted sequence of line items. Prices are
//! locked when a line is added (they are not re-read from the catalog at
//! checkout), and the cart is discarded after a successful or abandoned
//! checkout. Only the snapshot written into a purchase ledger entry
//! survives.

use crate::types::PosError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A pending line item for one purchase
///
/// Constructed through [`CartLine::new`], which rejects malformed input at
/// the boundary instead of trusting shape at the point of use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    /// Catalog product id
    pub product_id: String,

    /// Price per unit, captured at add-to-cart time
    pub unit_price: Decimal,

    /// Number of units, always positive
    pub quantity: u32,
}

impl CartLine {
    /// Create a cart line, validating price and quantity
    ///
    /// # Errors
    ///
    /// Returns `PosError::InvalidRecord` if the product id is empty, the
    /// unit price is negative, or the quantity is zero.
    pub fn new(product_id: &str, unit_price: Decimal, quantity: u32) -> Result<Self, PosError> {
        if product_id.trim().is_empty() {
            return Err(PosError::invalid_record("product id must not be empty"));
        }
        if unit_price < Decimal::ZERO {
            return Err(PosError::invalid_record("unit price must not be negative"));
        }
        if quantity == 0 {
            return Err(PosError::invalid_record("quantity must be positive"));
        }

        Ok(CartLine {
            product_id: product_id.trim().to_string(),
            unit_price,
            quantity,
        })
    }

    /// Line total: `unit_price * quantity` with checked arithmetic
    ///
    /// # Errors
    ///
    /// Returns `PosError::ArithmeticOverflow` if the multiplication
    /// overflows.
    pub fn line_total(&self) -> Result<Decimal, PosError> {
        self.unit_price
            .checked_mul(Decimal::from(self.quantity))
            .ok_or_else(|| PosError::arithmetic_overflow("line total", &self.product_id))
    }
}

/// Sum of all line totals in a cart
///
/// The caller is responsible for rejecting an empty cart first; an empty
/// slice sums to zero here.
///
/// # Errors
///
/// Returns `PosError::ArithmeticOverflow` if any line total or the running
/// sum overflows.
pub fn cart_total(cart: &[CartLine]) -> Result<Decimal, PosError> {
    let mut total = Decimal::ZERO;
    for line in cart {
        total = total
            .checked_add(line.line_total()?)
            .ok_or_else(|| PosError::arithmetic_overflow("cart total", &line.product_id))?;
    }
    Ok(total)
}
