//! Order submission flow.
//!
//! `Idle -> Validating -> Submitting -> Succeeded | Failed`. Validation
//! is synchronous and happens before any I/O; submission re-prices the
//! current cart one final time, freezes the result into an immutable
//! order, persists it, then records loyalty spend best-effort and clears
//! the cart.
//!
//! Order creation never depends on loyalty success: the order is the
//! source of truth for "did the purchase happen", loyalty is
//! enrichment. A failed accrual is logged and tolerated.

mod error;

pub use error::CheckoutError;

use chrono::{DateTime, Datelike, Utc};
use tracing::instrument;
use uuid::Uuid;

use atelier_core::{Money, OrderId, OrderStatus, PaymentMethodKind};

use super::cart::Cart;
use super::loyalty::LoyaltyService;
use super::pricing::compute_pricing;
use crate::config::StorefrontConfig;
use crate::models::{Address, Order, OrderLine};
use crate::store::{DocumentStore, OrderRepository};

/// Amex cards are 15 digits starting 34 or 37 and carry a 4-digit CVV.
const AMEX_PREFIXES: [&str; 2] = ["34", "37"];

/// Payment-method-specific input collected at checkout.
///
/// Only the method tag survives into the order; the sensitive fields
/// are validated here and dropped.
#[derive(Debug, Clone)]
pub enum PaymentDetails {
    CashOnDelivery,
    Upi {
        id: String,
    },
    Card {
        holder_name: String,
        number: String,
        /// `MM/YY`.
        expiry: String,
        cvv: String,
    },
}

impl PaymentDetails {
    /// The method tag recorded on the order.
    #[must_use]
    pub const fn kind(&self) -> PaymentMethodKind {
        match self {
            Self::CashOnDelivery => PaymentMethodKind::CashOnDelivery,
            Self::Upi { .. } => PaymentMethodKind::Upi,
            Self::Card { .. } => PaymentMethodKind::Card,
        }
    }

    /// Validate the method-specific fields against `now`.
    ///
    /// # Errors
    ///
    /// Returns the specific validation error for the first failing
    /// field; cash-on-delivery has none.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<(), CheckoutError> {
        match self {
            Self::CashOnDelivery => Ok(()),
            Self::Upi { id } => validate_upi(id),
            Self::Card {
                holder_name,
                number,
                expiry,
                cvv,
            } => validate_card(holder_name, number, expiry, cvv, now),
        }
    }
}

/// Handle to a successfully created order, for navigation and any
/// downstream notification or analytics consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedOrder {
    pub order_id: OrderId,
    pub total: Money,
    pub items_count: u32,
}

/// Checkout service.
pub struct CheckoutService<'a, S> {
    orders: OrderRepository<'a, S>,
    config: &'a StorefrontConfig,
}

impl<'a, S: DocumentStore> CheckoutService<'a, S> {
    /// Create a new checkout service.
    #[must_use]
    pub const fn new(store: &'a S, config: &'a StorefrontConfig) -> Self {
        Self {
            orders: OrderRepository::new(store),
            config,
        }
    }

    /// Validate a submission without performing it.
    ///
    /// # Errors
    ///
    /// Returns the first applicable validation error; see
    /// [`CheckoutError`].
    pub fn validate(
        &self,
        cart: &Cart,
        address: Option<&Address>,
        payment: &PaymentDetails,
    ) -> Result<(), CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        if address.is_none() {
            return Err(CheckoutError::NoAddress);
        }
        payment.validate(Utc::now())?;
        if !self.config.checkout.accepts(payment.kind()) {
            return Err(CheckoutError::UnsupportedPaymentMethod(payment.kind()));
        }
        Ok(())
    }

    /// Run the full submission flow for a cart.
    ///
    /// On success the cart is cleared and the created order's id and
    /// totals are returned. On any failure the cart is left untouched
    /// and no order exists.
    ///
    /// # Errors
    ///
    /// Validation errors before any I/O; `CheckoutError::Order` /
    /// `CheckoutError::Loyalty` for persistence failures during
    /// submission.
    #[instrument(skip_all, fields(user = %loyalty.user_id(), items = cart.items_count()))]
    pub async fn place_order(
        &self,
        cart: &mut Cart,
        loyalty: &LoyaltyService<'_, S>,
        address: Option<&Address>,
        payment: &PaymentDetails,
    ) -> Result<PlacedOrder, CheckoutError> {
        // Validating
        self.validate(cart, address, payment)?;
        let address = address.ok_or(CheckoutError::NoAddress)?;

        // Submitting: price the *current* cart one final time, so a
        // stale preview can never leak into the frozen totals
        let ledger = loyalty.load().await?;
        let pricing = compute_pricing(cart, &ledger, &self.config.pricing);

        let order = Order {
            id: OrderId::new(Uuid::new_v4().to_string()),
            user_id: loyalty.user_id().clone(),
            lines: cart.lines().iter().map(order_line).collect(),
            items_count: cart.items_count(),
            subtotal: pricing.subtotal,
            shipping: pricing.shipping,
            discount: pricing.discount_amount,
            total: pricing.total,
            address: address.clone(),
            payment_method: payment.kind(),
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        };
        self.orders.create(&order).await?;

        // Loyalty accrual is best-effort: the order is already the
        // source of truth, so a failed accrual is logged, not rolled back
        if let Err(e) = loyalty.add_spending(order.total).await {
            tracing::warn!(order = %order.id, error = %e, "loyalty accrual failed after order creation");
        }

        cart.clear();
        tracing::info!(order = %order.id, total = %order.total, "order placed");

        Ok(PlacedOrder {
            order_id: order.id,
            total: order.total,
            items_count: order.items_count,
        })
    }
}

fn order_line(line: &super::cart::CartLine) -> OrderLine {
    OrderLine {
        product_id: line.product_id.clone(),
        name: line.name.clone(),
        brand: line.brand.clone(),
        image: line.image.clone(),
        size: line.size.clone(),
        unit_price: line.unit_price,
        quantity: line.quantity,
    }
}

// =============================================================================
// Field Validation
// =============================================================================

/// UPI ids look like `localpart@handle`.
fn validate_upi(id: &str) -> Result<(), CheckoutError> {
    let Some((local, handle)) = id.split_once('@') else {
        return Err(CheckoutError::InvalidUpi);
    };
    let local_ok = !local.is_empty()
        && local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    let handle_ok = handle.len() >= 2 && handle.chars().all(|c| c.is_ascii_alphabetic());
    if local_ok && handle_ok {
        Ok(())
    } else {
        Err(CheckoutError::InvalidUpi)
    }
}

fn is_amex(number: &str) -> bool {
    number.len() == 15 && AMEX_PREFIXES.iter().any(|p| number.starts_with(p))
}

fn validate_card(
    holder_name: &str,
    number: &str,
    expiry: &str,
    cvv: &str,
    now: DateTime<Utc>,
) -> Result<(), CheckoutError> {
    if holder_name.trim().is_empty() {
        return Err(CheckoutError::InvalidCardName);
    }

    let digits: String = number.chars().filter(|c| !c.is_whitespace()).collect();
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(CheckoutError::InvalidCardNumber);
    }
    let amex = is_amex(&digits);
    if digits.len() != 16 && !amex {
        return Err(CheckoutError::InvalidCardNumber);
    }

    validate_expiry(expiry, now)?;

    let cvv_len = if amex { 4 } else { 3 };
    if cvv.len() != cvv_len || !cvv.chars().all(|c| c.is_ascii_digit()) {
        return Err(CheckoutError::InvalidCvv);
    }

    Ok(())
}

/// Parse `MM/YY` and reject months earlier than the current one.
fn validate_expiry(expiry: &str, now: DateTime<Utc>) -> Result<(), CheckoutError> {
    let Some((month, year)) = expiry.split_once('/') else {
        return Err(CheckoutError::InvalidExpiry);
    };
    if month.len() != 2 || year.len() != 2 {
        return Err(CheckoutError::InvalidExpiry);
    }
    let month: u32 = month.parse().map_err(|_| CheckoutError::InvalidExpiry)?;
    let year: i32 = year.parse().map_err(|_| CheckoutError::InvalidExpiry)?;
    if !(1..=12).contains(&month) {
        return Err(CheckoutError::InvalidExpiry);
    }
    let year = 2000 + year;

    if (year, month) < (now.year(), now.month()) {
        return Err(CheckoutError::CardExpired);
    }
    Ok(())
}
