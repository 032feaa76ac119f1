//! Core types for Atelier.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod money;
pub mod status;
pub mod tier;

pub use id::*;
pub use money::Money;
pub use status::{OrderStatus, PaymentMethodKind, StatusParseError};
pub use tier::{Tier, TierId, TierParseError};
