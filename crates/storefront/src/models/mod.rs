//! Persisted and catalog-sourced entities.
//!
//! Every persisted document has an explicit struct here; documents that
//! fail to deserialize surface as `StoreError::Malformed` at the store
//! boundary instead of being silently defaulted in business logic.

pub mod address;
pub mod ledger;
pub mod order;
pub mod product;

pub use address::Address;
pub use ledger::{Coupon, LoyaltyLedger, PointsEntry, PointsKind};
pub use order::{Order, OrderLine};
pub use product::Product;
