//! Shipping address snapshot.

use serde::{Deserialize, Serialize};

/// A shipping address as frozen into an order.
///
/// Orders store a copy, not a reference: edits to the customer's saved
/// addresses never rewrite where a past order shipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub recipient: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub phone: String,
}
