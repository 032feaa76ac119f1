//! Integration tests for Atelier.
//!
//! End-to-end scenarios over the storefront engine backed by the
//! in-memory document store. This crate's library holds the shared
//! fixtures; the scenarios live in `tests/`.
//!
//! # Test Categories
//!
//! - `checkout_flow` - Cart to frozen order, partial-failure policy
//! - `loyalty_rewards` - Ledger lifecycle, accrual, tier progression

#![cfg_attr(not(test), forbid(unsafe_code))]

use serde_json::Value;

use atelier_core::{Money, ProductId};
use atelier_storefront::models::{Address, Product};
use atelier_storefront::store::{DocumentStore, InMemoryStore, StoreError};

/// Install a tracing subscriber for test output.
///
/// Safe to call from every test; only the first call wins.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_test_writer()
        .try_init();
}

/// A sample product for cart fixtures.
#[must_use]
pub fn product(id: &str, price: i64) -> Product {
    Product {
        id: ProductId::new(id),
        name: format!("Sample {id}"),
        brand: "Atelier".to_owned(),
        price: Money::from_major(price),
        image: format!("{id}.webp"),
        sizes: vec!["S".to_owned(), "M".to_owned(), "L".to_owned()],
    }
}

/// A sample shipping address.
#[must_use]
pub fn address() -> Address {
    Address {
        recipient: "A. Customer".to_owned(),
        street: "12 Mill Road".to_owned(),
        city: "Pune".to_owned(),
        state: "MH".to_owned(),
        postal_code: "411001".to_owned(),
        phone: "9900112233".to_owned(),
    }
}

/// A store whose atomic updates fail for one collection.
///
/// Reads and creates pass through, so checkout can price and persist an
/// order while loyalty accrual (an update on the ledgers collection)
/// fails. Exercises the accepted partial-failure policy.
pub struct FlakyStore {
    inner: InMemoryStore,
    deny_updates: &'static str,
}

impl FlakyStore {
    /// Wrap a fresh in-memory store, denying updates to `collection`.
    #[must_use]
    pub fn denying_updates(collection: &'static str) -> Self {
        Self {
            inner: InMemoryStore::new(),
            deny_updates: collection,
        }
    }
}

impl DocumentStore for FlakyStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Value, StoreError> {
        self.inner.get(collection, id).await
    }

    async fn create(&self, collection: &str, id: &str, doc: Value) -> Result<(), StoreError> {
        self.inner.create(collection, id, doc).await
    }

    async fn get_or_create(
        &self,
        collection: &str,
        id: &str,
        default: Value,
    ) -> Result<(Value, bool), StoreError> {
        self.inner.get_or_create(collection, id, default).await
    }

    async fn update_with<E, F>(&self, collection: &str, id: &str, apply: F) -> Result<Value, E>
    where
        F: FnOnce(&mut Value) -> Result<(), E> + Send,
        E: From<StoreError> + Send,
    {
        if collection == self.deny_updates {
            return Err(E::from(StoreError::Unavailable(format!(
                "updates denied for {collection}"
            ))));
        }
        self.inner.update_with(collection, id, apply).await
    }

    async fn find_by(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Value>, StoreError> {
        self.inner.find_by(collection, field, value).await
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        self.inner.delete(collection, id).await
    }
}
