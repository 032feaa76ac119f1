//! Immutable order snapshots.
//!
//! An order freezes everything the customer saw at submission: line
//! items with their locked-in prices, the computed totals, and the
//! shipping address. Nothing here is ever recomputed from live cart or
//! catalog state; the only field that changes after creation is
//! `status`, and only along the transitions `OrderStatus` permits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use atelier_core::{Money, OrderId, OrderStatus, PaymentMethodKind, ProductId, UserId};

use super::address::Address;

/// A completed checkout, frozen at submission time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub lines: Vec<OrderLine>,
    /// Total quantity across all lines.
    pub items_count: u32,
    pub subtotal: Money,
    pub shipping: Money,
    pub discount: Money,
    pub total: Money,
    pub address: Address,
    pub payment_method: PaymentMethodKind,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// One frozen line item on an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub name: String,
    pub brand: String,
    pub image: String,
    pub size: String,
    pub unit_price: Money,
    pub quantity: u32,
}

impl OrderLine {
    /// Price of this line: unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.unit_price * self.quantity
    }
}
