//! Document-store boundary.
//!
//! The managed backend is a document database with get/create/update
//! semantics and simple equality queries. This module defines the
//! [`DocumentStore`] trait the engine is written against, typed
//! repositories for each collection, and an in-memory implementation
//! used by tests.
//!
//! # Collections
//!
//! - `ledgers` - One loyalty ledger per user, keyed by user id
//! - `orders` - Immutable order snapshots, keyed by order id
//!
//! # Atomicity
//!
//! The ledger is the one multi-writer document in the system. Every
//! ledger mutation goes through [`DocumentStore::update_with`], which the
//! store executes as a single serialized read-modify-write, so two
//! near-simultaneous checkouts cannot lose a spend update.

pub mod ledgers;
pub mod memory;
pub mod orders;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

pub use ledgers::LedgerRepository;
pub use memory::InMemoryStore;
pub use orders::{OrderError, OrderRepository};

/// Collection names used by the storefront engine.
pub mod collections {
    /// Loyalty ledgers, keyed by user id.
    pub const LEDGERS: &str = "ledgers";
    /// Order snapshots, keyed by order id.
    pub const ORDERS: &str = "orders";
}

/// Errors surfaced by the document store and its repositories.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No document with the given id exists in the collection.
    #[error("document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    /// A document with the given id already exists.
    #[error("document already exists: {collection}/{id}")]
    Conflict { collection: String, id: String },

    /// A persisted document does not match its expected schema.
    #[error("malformed record {collection}/{id}: {reason}")]
    Malformed {
        collection: String,
        id: String,
        reason: String,
    },

    /// The store could not be reached or rejected the call transiently.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Abstract document store with per-document atomic updates.
///
/// Implementations must serialize calls to [`update_with`] for the same
/// document; the closure observes the latest persisted value and its
/// result replaces it atomically.
///
/// [`update_with`]: DocumentStore::update_with
#[allow(async_fn_in_trait)] // consumers are generic over the store, never dyn
pub trait DocumentStore: Send + Sync {
    /// Fetch a document by id.
    async fn get(&self, collection: &str, id: &str) -> Result<Value, StoreError>;

    /// Create a document; fails with `Conflict` if the id is taken.
    async fn create(&self, collection: &str, id: &str, doc: Value) -> Result<(), StoreError>;

    /// Fetch a document, atomically creating it from `default` if absent.
    ///
    /// Returns the document and whether this call created it. Two
    /// concurrent calls for the same id observe exactly one creation.
    async fn get_or_create(
        &self,
        collection: &str,
        id: &str,
        default: Value,
    ) -> Result<(Value, bool), StoreError>;

    /// Atomically apply `apply` to a document and persist the result.
    ///
    /// Fails with `NotFound` if the document does not exist; any error
    /// returned by `apply` aborts the update and leaves the document
    /// unchanged.
    async fn update_with<E, F>(&self, collection: &str, id: &str, apply: F) -> Result<Value, E>
    where
        F: FnOnce(&mut Value) -> Result<(), E> + Send,
        E: From<StoreError> + Send;

    /// Find documents whose top-level `field` equals `value`.
    async fn find_by(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Value>, StoreError>;

    /// Delete a document by id; fails with `NotFound` if absent.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;
}

/// Deserialize a persisted document, failing fast on shape violations.
///
/// Missing or mistyped fields surface as `Malformed` instead of being
/// silently defaulted inside business logic.
pub(crate) fn decode<T: DeserializeOwned>(
    collection: &str,
    id: &str,
    doc: Value,
) -> Result<T, StoreError> {
    serde_json::from_value(doc).map_err(|e| StoreError::Malformed {
        collection: collection.to_owned(),
        id: id.to_owned(),
        reason: e.to_string(),
    })
}

/// Serialize an entity for persistence.
pub(crate) fn encode<T: Serialize>(
    collection: &str,
    id: &str,
    entity: &T,
) -> Result<Value, StoreError> {
    serde_json::to_value(entity).map_err(|e| StoreError::Malformed {
        collection: collection.to_owned(),
        id: id.to_owned(),
        reason: e.to_string(),
    })
}
