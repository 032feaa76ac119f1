//! Status enums for orders and payment methods.
//!
//! The order status machine only moves forward:
//!
//! ```text
//! pending -> processing -> shipped -> in-transit -> delivered
//!    \            \
//!     +-----------+--> cancelled
//! ```
//!
//! Cancellation is allowed from `pending` and `processing` only; once an
//! order has shipped it can no longer be cancelled. `delivered` and
//! `cancelled` are terminal.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error parsing a status or payment-method string.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unrecognized value: {0}")]
pub struct StatusParseError(pub String);

/// Fulfillment status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    InTransit,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Whether the status machine permits moving from `self` to `to`.
    #[must_use]
    pub const fn can_transition_to(self, to: Self) -> bool {
        matches!(
            (self, to),
            (Self::Pending, Self::Processing | Self::Cancelled)
                | (Self::Processing, Self::Shipped | Self::Cancelled)
                | (Self::Shipped, Self::InTransit)
                | (Self::InTransit, Self::Delivered)
        )
    }

    /// Whether no further transitions are possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::InTransit => "in-transit",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "shipped" => Ok(Self::Shipped),
            "in-transit" => Ok(Self::InTransit),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(StatusParseError(other.to_owned())),
        }
    }
}

/// Payment method tag recorded on an order.
///
/// The tag identifies how the customer paid; the method-specific input
/// (card number, UPI id) is validated at checkout and never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethodKind {
    CashOnDelivery,
    Card,
    Upi,
}

impl std::fmt::Display for PaymentMethodKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::CashOnDelivery => "cash_on_delivery",
            Self::Card => "card",
            Self::Upi => "upi",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for PaymentMethodKind {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash_on_delivery" | "cod" => Ok(Self::CashOnDelivery),
            "card" => Ok(Self::Card),
            "upi" => Ok(Self::Upi),
            other => Err(StatusParseError(other.to_owned())),
        }
    }
}
