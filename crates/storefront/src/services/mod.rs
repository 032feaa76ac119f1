//! Business services of the storefront engine.
//!
//! - [`cart`] - The in-memory cart aggregate (pure, no I/O)
//! - [`pricing`] - The single shared pricing pipeline and discount
//!   calculator
//! - [`loyalty`] - The tiered rewards service over the ledger repository
//! - [`checkout`] - Payment validation and the order submission flow
//!
//! Services are constructed with their store dependency and user
//! identity injected; nothing here is a process-wide singleton, so tests
//! instantiate isolated instances freely.

pub mod cart;
pub mod checkout;
pub mod loyalty;
pub mod pricing;

pub use cart::{Cart, CartLine};
pub use checkout::{CheckoutError, CheckoutService, PaymentDetails, PlacedOrder};
pub use loyalty::{LoyaltyError, LoyaltyService};
pub use pricing::{Discount, PricingSnapshot, calculate_discount, compute_pricing};
