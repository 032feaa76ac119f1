//! Ledger repository.
//!
//! One loyalty ledger per user, keyed by user id. First load mints the
//! default ledger through the store's create-if-absent, so two devices
//! racing on a fresh account observe exactly one signup bonus. All
//! mutations run inside [`DocumentStore::update_with`], which closes the
//! read-modify-write race between concurrent checkouts.

use chrono::Utc;

use atelier_core::UserId;

use super::{DocumentStore, StoreError, collections::LEDGERS, decode, encode};
use crate::models::LoyaltyLedger;

/// Repository for loyalty ledger documents.
pub struct LedgerRepository<'a, S> {
    store: &'a S,
}

impl<'a, S: DocumentStore> LedgerRepository<'a, S> {
    /// Create a new ledger repository.
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Fetch a user's ledger, minting the default one if none exists.
    ///
    /// Returns the ledger and whether this call created it.
    /// Initialization is at-most-once per user: a concurrent first load
    /// sees the ledger the other call created, welcome bonus included.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the store cannot be reached,
    /// `StoreError::Malformed` if the persisted ledger fails to decode.
    pub async fn load_or_init(&self, user_id: &UserId) -> Result<(LoyaltyLedger, bool), StoreError> {
        let fresh = LoyaltyLedger::new_for(user_id.clone(), Utc::now());
        let default = encode(LEDGERS, user_id.as_str(), &fresh)?;
        let (doc, created) = self
            .store
            .get_or_create(LEDGERS, user_id.as_str(), default)
            .await?;
        Ok((decode(LEDGERS, user_id.as_str(), doc)?, created))
    }

    /// Fetch a user's ledger without creating one.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the user has no ledger yet.
    pub async fn get(&self, user_id: &UserId) -> Result<LoyaltyLedger, StoreError> {
        let doc = self.store.get(LEDGERS, user_id.as_str()).await?;
        decode(LEDGERS, user_id.as_str(), doc)
    }

    /// Atomically mutate a user's ledger and persist the result.
    ///
    /// `apply` sees the freshly decoded ledger and reports whether it
    /// changed anything. When it returns `true` the ledger is re-encoded
    /// with a new `last_updated` marker and written back in the same
    /// store operation; when it returns `false` the persisted document
    /// is left byte-for-byte as it was. An error from `apply` aborts the
    /// update.
    ///
    /// # Errors
    ///
    /// Propagates store failures (through `E: From<StoreError>`) and any
    /// error `apply` returns.
    pub async fn update<E, F>(&self, user_id: &UserId, apply: F) -> Result<LoyaltyLedger, E>
    where
        F: FnOnce(&mut LoyaltyLedger) -> Result<bool, E> + Send,
        E: From<StoreError> + Send,
    {
        let doc = self
            .store
            .update_with::<E, _>(LEDGERS, user_id.as_str(), |doc| {
                let mut ledger: LoyaltyLedger =
                    decode(LEDGERS, user_id.as_str(), doc.clone()).map_err(E::from)?;
                if apply(&mut ledger)? {
                    ledger.last_updated = Utc::now();
                    *doc = encode(LEDGERS, user_id.as_str(), &ledger).map_err(E::from)?;
                }
                Ok(())
            })
            .await?;
        decode(LEDGERS, user_id.as_str(), doc).map_err(E::from)
    }
}
