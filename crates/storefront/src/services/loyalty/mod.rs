//! Loyalty service.
//!
//! The tiered rewards engine: ledger lifecycle, spend accrual with tier
//! unlocks, the points ledger, and tier selection. One instance serves
//! one user; construct it with the store and the authenticated user id
//! (there is no guest ledger).
//!
//! Every mutation is a single atomic read-modify-write against the
//! persisted ledger document, so concurrent sessions for the same user
//! cannot lose updates to `total_spent` or the unlocked set.

mod error;

pub use error::LoyaltyError;

use tracing::instrument;

use atelier_core::{Money, TierId, UserId};

use crate::models::{LoyaltyLedger, ledger::SPEND_PER_POINT};
use crate::store::{DocumentStore, LedgerRepository};

/// History title recorded for checkout spend accrual.
const ORDER_PURCHASE_TITLE: &str = "Order Purchase";

/// Loyalty service for a single user.
pub struct LoyaltyService<'a, S> {
    ledgers: LedgerRepository<'a, S>,
    user_id: UserId,
}

impl<'a, S: DocumentStore> LoyaltyService<'a, S> {
    /// Create a loyalty service for a user.
    #[must_use]
    pub const fn new(store: &'a S, user_id: UserId) -> Self {
        Self {
            ledgers: LedgerRepository::new(store),
            user_id,
        }
    }

    /// The user this service operates for.
    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Fetch the user's ledger, minting the default one on first access.
    ///
    /// # Errors
    ///
    /// Returns `LoyaltyError::Store` if the ledger cannot be loaded or
    /// initialized.
    #[instrument(skip(self), fields(user = %self.user_id))]
    pub async fn load(&self) -> Result<LoyaltyLedger, LoyaltyError> {
        let (ledger, created) = self.ledgers.load_or_init(&self.user_id).await?;
        if created {
            tracing::info!(referral = %ledger.referral_code, "minted loyalty ledger");
        }
        Ok(ledger)
    }

    /// Record order spend: bump lifetime spend, re-derive unlocked
    /// tiers, and award one point per 100 units spent.
    ///
    /// Call once per distinct order; the operation itself is atomic but
    /// deliberately not deduplicating, so a duplicate call would
    /// double-count spend.
    ///
    /// # Errors
    ///
    /// Returns `LoyaltyError::InvalidAmount` if `amount` is not
    /// positive, `LoyaltyError::Store` on persistence failure.
    #[instrument(skip(self), fields(user = %self.user_id, amount = %amount))]
    pub async fn add_spending(&self, amount: Money) -> Result<LoyaltyLedger, LoyaltyError> {
        if !amount.is_positive() {
            return Err(LoyaltyError::InvalidAmount);
        }
        self.load().await?;

        let points = amount.floor_div(SPEND_PER_POINT);
        let now = chrono::Utc::now();
        let ledger = self
            .ledgers
            .update::<LoyaltyError, _>(&self.user_id, |ledger| {
                ledger.total_spent += amount;
                ledger.recompute_unlocked();
                // Orders under one accrual unit earn nothing; skip the
                // zero entry rather than reject the spend
                if points > 0 {
                    ledger.record_points(points, ORDER_PURCHASE_TITLE, now);
                }
                Ok(true)
            })
            .await?;

        tracing::debug!(
            total_spent = %ledger.total_spent,
            points,
            unlocked = ledger.unlocked_tiers.len(),
            "recorded spending"
        );
        Ok(ledger)
    }

    /// Move the points balance and append a history entry.
    ///
    /// Positive amounts earn, negative amounts spend. Zero is rejected,
    /// and a debit may never drive the balance below zero.
    ///
    /// # Errors
    ///
    /// Returns `LoyaltyError::InvalidAmount` for zero,
    /// `LoyaltyError::InsufficientPoints` for an over-debit,
    /// `LoyaltyError::Store` on persistence failure.
    #[instrument(skip(self, title), fields(user = %self.user_id, amount))]
    pub async fn add_points(&self, amount: i64, title: &str) -> Result<LoyaltyLedger, LoyaltyError> {
        if amount == 0 {
            return Err(LoyaltyError::InvalidAmount);
        }
        self.load().await?;

        let now = chrono::Utc::now();
        self.ledgers
            .update::<LoyaltyError, _>(&self.user_id, |ledger| {
                if amount < 0 && ledger.points + amount < 0 {
                    return Err(LoyaltyError::InsufficientPoints {
                        balance: ledger.points,
                        debit: -amount,
                    });
                }
                ledger.record_points(amount, title, now);
                Ok(true)
            })
            .await
    }

    /// Select a tier for checkout discounts.
    ///
    /// Returns `false` when the tier is not unlocked; the refusal leaves
    /// the persisted ledger untouched, `last_updated` included. `true`
    /// means the selection was applied and persisted.
    ///
    /// # Errors
    ///
    /// Returns `LoyaltyError::Store` on persistence failure.
    #[instrument(skip(self), fields(user = %self.user_id, tier = %tier_id))]
    pub async fn select_tier(&self, tier_id: TierId) -> Result<bool, LoyaltyError> {
        self.load().await?;

        let mut applied = false;
        self.ledgers
            .update::<LoyaltyError, _>(&self.user_id, |ledger| {
                if ledger.unlocked_tiers.contains(&tier_id) {
                    ledger.selected_tier = Some(tier_id);
                    applied = true;
                }
                Ok(applied)
            })
            .await?;
        Ok(applied)
    }

    /// Clear the tier selection.
    ///
    /// A no-op (including on disk) when nothing is selected.
    ///
    /// # Errors
    ///
    /// Returns `LoyaltyError::Store` on persistence failure.
    #[instrument(skip(self), fields(user = %self.user_id))]
    pub async fn deselect_tier(&self) -> Result<(), LoyaltyError> {
        self.load().await?;

        self.ledgers
            .update::<LoyaltyError, _>(&self.user_id, |ledger| {
                Ok(ledger.selected_tier.take().is_some())
            })
            .await?;
        Ok(())
    }

    /// Progress toward unlocking a tier, as a percentage 0-100.
    ///
    /// # Errors
    ///
    /// Returns `LoyaltyError::Store` if the ledger cannot be loaded.
    pub async fn card_progress(&self, tier_id: TierId) -> Result<u8, LoyaltyError> {
        Ok(self.load().await?.card_progress(tier_id))
    }
}
