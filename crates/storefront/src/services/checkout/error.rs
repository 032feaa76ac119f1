//! Checkout error types.
//!
//! Validation errors are detected synchronously before any I/O and are
//! surfaced verbatim; the cart is untouched on every failure path.

use thiserror::Error;

use atelier_core::PaymentMethodKind;

use crate::services::loyalty::LoyaltyError;
use crate::store::{OrderError, StoreError};

/// Errors that can occur during checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The cart has no lines.
    #[error("cart is empty")]
    EmptyCart,

    /// No shipping address was selected.
    #[error("no shipping address selected")]
    NoAddress,

    /// UPI id does not match the `localpart@handle` pattern.
    #[error("invalid UPI id")]
    InvalidUpi,

    /// Cardholder name is empty.
    #[error("cardholder name is required")]
    InvalidCardName,

    /// Card number is not 16 digits (or 15 with an Amex prefix).
    #[error("invalid card number")]
    InvalidCardNumber,

    /// Expiry is not a valid `MM/YY`.
    #[error("invalid expiry date")]
    InvalidExpiry,

    /// Expiry resolves to a month earlier than the current one.
    #[error("card has expired")]
    CardExpired,

    /// CVV is not 3 digits (4 for Amex).
    #[error("invalid CVV")]
    InvalidCvv,

    /// The payment method validates but is not enabled for order
    /// creation yet.
    #[error("payment method not yet supported: {0}")]
    UnsupportedPaymentMethod(PaymentMethodKind),

    /// Order persistence failed; no order was created.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// Ledger could not be loaded for pricing.
    #[error(transparent)]
    Loyalty(#[from] LoyaltyError),

    /// Store-level failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}
