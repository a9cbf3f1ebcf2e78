//! # Cart
//!
//! The lines that make up the subtotal handed to the checkout.
//!
//! ## Invariants
//! - Lines are unique by SKU, compared after trimming whitespace
//! - Quantity is 1..=999; setting it to 0 removes the line
//! - At most 100 lines
//! - Unit price is frozen when the line is added

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CartError;
use crate::money::Money;
use crate::validation::{validate_price_cents, validate_quantity, validate_sku};
use crate::{MAX_CART_LINES, MAX_LINE_QUANTITY};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub sku: String,
    pub name: String,
    pub unit_price: Money,
    pub quantity: i64,
}

impl CartLine {
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Cart::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Adds a product or bumps the quantity of an existing line.
    pub fn add(&mut self, sku: &str, name: &str, unit_price: Money, quantity: i64) -> Result<(), CartError> {
        let sku = sku.trim();
        validate_sku(sku)?;
        validate_quantity(quantity)?;
        validate_price_cents(unit_price.cents())?;

        if let Some(line) = self.lines.iter_mut().find(|l| l.sku == sku) {
            let requested = line.quantity + quantity;
            if requested > MAX_LINE_QUANTITY {
                return Err(CartError::QuantityTooLarge {
                    requested,
                    max: MAX_LINE_QUANTITY,
                });
            }
            line.quantity = requested;
            return Ok(());
        }

        if self.lines.len() >= MAX_CART_LINES {
            return Err(CartError::TooManyLines { max: MAX_CART_LINES });
        }

        self.lines.push(CartLine {
            sku: sku.to_string(),
            name: name.to_string(),
            unit_price,
            quantity,
        });
        Ok(())
    }

    /// Sets the quantity of a line; 0 removes it.
    pub fn set_quantity(&mut self, sku: &str, quantity: i64) -> Result<(), CartError> {
        let sku = sku.trim();
        if quantity == 0 {
            return self.remove(sku);
        }
        validate_quantity(quantity)?;

        let line = self
            .lines
            .iter_mut()
            .find(|l| l.sku == sku)
            .ok_or_else(|| CartError::LineNotFound(sku.to_string()))?;
        line.quantity = quantity;
        Ok(())
    }

    pub fn remove(&mut self, sku: &str) -> Result<(), CartError> {
        let sku = sku.trim();
        let before = self.lines.len();
        self.lines.retain(|l| l.sku != sku);

        if self.lines.len() == before {
            Err(CartError::LineNotFound(sku.to_string()))
        } else {
            Ok(())
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
