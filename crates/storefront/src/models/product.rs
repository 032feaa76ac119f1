//! Catalog product as seen by the cart.
//!
//! The product catalog itself lives behind the managed backend; the
//! engine only consumes the fields it copies into a cart line at
//! add-time. `price` is locked into the line at that moment and never
//! re-read, so mid-session catalog price changes do not move a cart's
//! total.

use serde::{Deserialize, Serialize};

use atelier_core::{Money, ProductId};

/// A product at the moment it is added to the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub brand: String,
    /// Current catalog price, copied into the cart line at add-time.
    pub price: Money,
    pub image: String,
    pub sizes: Vec<String>,
}
