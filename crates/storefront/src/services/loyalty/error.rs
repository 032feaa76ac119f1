//! Loyalty error types.

use thiserror::Error;

use crate::store::StoreError;

/// Errors that can occur during loyalty operations.
#[derive(Debug, Error)]
pub enum LoyaltyError {
    /// A points movement of zero was requested; no-op history entries
    /// are rejected to keep the history meaningful.
    #[error("points amount must be non-zero")]
    InvalidAmount,

    /// A debit would drive the points balance below zero.
    #[error("insufficient points: balance {balance}, debit {debit}")]
    InsufficientPoints { balance: i64, debit: i64 },

    /// Store-level failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}
