//! The shared pricing pipeline.
//!
//! `subtotal -> shipping -> discount -> total`, derived from scratch on
//! every call. There is exactly one implementation and one
//! [`PricingConfig`]; the cart preview and the checkout summary both go
//! through [`compute_pricing`], so the total a customer sees can only
//! change when the cart or ledger actually changes.

use std::collections::BTreeSet;

use atelier_core::{Money, Tier, TierId};

use super::cart::Cart;
use crate::config::PricingConfig;
use crate::models::LoyaltyLedger;

/// A computed tier discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Discount {
    /// The tier's rate; zero when no unlocked tier is selected.
    pub percent: u8,
    /// Subtotal times rate, rounded half-up to a whole currency unit.
    pub amount: Money,
}

/// The derived totals for a cart + ledger state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingSnapshot {
    pub subtotal: Money,
    pub shipping: Money,
    pub discount_percent: u8,
    pub discount_amount: Money,
    /// `max(0, subtotal + shipping - discount)`.
    pub total: Money,
}

/// Discount for a selected tier against a subtotal.
///
/// Pure: no side effects, safe to call on every recompute. Returns a
/// zero discount when no tier is selected or the selected tier is not in
/// the caller-supplied unlocked set. A zero subtotal yields a zero
/// amount but still reports the tier's rate.
#[must_use]
pub fn calculate_discount(
    selected: Option<TierId>,
    unlocked: &BTreeSet<TierId>,
    subtotal: Money,
) -> Discount {
    let Some(tier_id) = selected else {
        return Discount::default();
    };
    if !unlocked.contains(&tier_id) {
        return Discount::default();
    }
    let percent = Tier::get(tier_id).discount_percent;
    Discount {
        percent,
        amount: subtotal.percent(percent),
    }
}

/// Derive the full pricing snapshot for a cart and ledger.
#[must_use]
pub fn compute_pricing(cart: &Cart, ledger: &LoyaltyLedger, config: &PricingConfig) -> PricingSnapshot {
    let subtotal: Money = cart.lines().iter().map(super::cart::CartLine::line_total).sum();
    let shipping = shipping_for(subtotal, config);
    let discount = calculate_discount(ledger.selected_tier, &ledger.unlocked_tiers, subtotal);
    let total = (subtotal + shipping - discount.amount).max(Money::ZERO);

    PricingSnapshot {
        subtotal,
        shipping,
        discount_percent: discount.percent,
        discount_amount: discount.amount,
        total,
    }
}

/// Shipping for a subtotal: nothing to ship costs nothing, above the
/// threshold ships free, otherwise the flat fee applies.
fn shipping_for(subtotal: Money, config: &PricingConfig) -> Money {
    if subtotal.is_zero() || subtotal > config.free_shipping_threshold {
        Money::ZERO
    } else {
        config.flat_shipping_fee
    }
}
