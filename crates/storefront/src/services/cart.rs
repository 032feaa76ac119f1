//! The cart aggregate.
//!
//! An in-memory collection of line items keyed by `(product, size)`.
//! All operations are synchronous pure transformations; persistence and
//! pricing are other modules' concerns. One session owns one cart; the
//! cart is never shared across sessions.
//!
//! # Invariants
//!
//! - At most one line per `(product_id, size)` key; adding an existing
//!   key increments its quantity instead.
//! - No line ever has `quantity < 1`. Decrementing a quantity-1 line is
//!   a no-op; callers that want removal call [`Cart::remove_item`]
//!   explicitly.
//! - `unit_price` is copied from the product when the line is created
//!   and never re-read, so checkout totals match what the customer saw.

use serde::{Deserialize, Serialize};

use atelier_core::{Money, ProductId};

use crate::models::Product;

/// One `(product, size)` entry in a cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub size: String,
    pub quantity: u32,
    /// Catalog price at the moment the line was created.
    pub unit_price: Money,
    pub name: String,
    pub brand: String,
    pub image: String,
}

impl CartLine {
    /// Price of this line: unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.unit_price * self.quantity
    }
}

/// The in-memory cart aggregate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// The lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Whether the cart holds no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total quantity across all lines (the cart badge number).
    #[must_use]
    pub fn items_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// The line for a `(product, size)` key, if present.
    #[must_use]
    pub fn line(&self, product_id: &ProductId, size: &str) -> Option<&CartLine> {
        self.lines
            .iter()
            .find(|l| &l.product_id == product_id && l.size == size)
    }

    /// Add one unit of a product in a size.
    ///
    /// Merges into an existing line for the same key; otherwise appends
    /// a new quantity-1 line, locking in the product's current price.
    pub fn add_item(&mut self, product: &Product, size: &str) {
        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|l| l.product_id == product.id && l.size == size)
        {
            line.quantity += 1;
            return;
        }
        self.lines.push(CartLine {
            product_id: product.id.clone(),
            size: size.to_owned(),
            quantity: 1,
            unit_price: product.price,
            name: product.name.clone(),
            brand: product.brand.clone(),
            image: product.image.clone(),
        });
    }

    /// Remove the line for a `(product, size)` key.
    ///
    /// A missing line is a no-op, not an error.
    pub fn remove_item(&mut self, product_id: &ProductId, size: &str) {
        self.lines
            .retain(|l| !(&l.product_id == product_id && l.size == size));
    }

    /// Adjust a line's quantity by `delta`, flooring at 1.
    ///
    /// Decrementing a quantity-1 line leaves it at 1; it never removes
    /// the line. A missing line is a no-op.
    pub fn update_quantity(&mut self, product_id: &ProductId, size: &str, delta: i32) {
        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|l| &l.product_id == product_id && l.size == size)
        {
            let adjusted = i64::from(line.quantity) + i64::from(delta);
            line.quantity = u32::try_from(adjusted.max(1)).unwrap_or(u32::MAX);
        }
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }
}
