//! Order repository.
//!
//! Orders are write-once snapshots; after creation only `status` moves,
//! and only along the transitions the status machine allows.

use serde_json::{Value, json};
use thiserror::Error;

use atelier_core::{OrderId, OrderStatus, UserId};

use super::{DocumentStore, StoreError, collections::ORDERS, decode, encode};
use crate::models::Order;

/// Errors from order persistence and status progression.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Store-level failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Requested status change is not permitted by the state machine.
    #[error("invalid status transition: {from} -> {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
}

/// Repository for order documents.
pub struct OrderRepository<'a, S> {
    store: &'a S,
}

impl<'a, S: DocumentStore> OrderRepository<'a, S> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Persist a freshly assembled order snapshot.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` if the order id is already taken.
    pub async fn create(&self, order: &Order) -> Result<(), OrderError> {
        let doc = encode(ORDERS, order.id.as_str(), order)?;
        self.store.create(ORDERS, order.id.as_str(), doc).await?;
        Ok(())
    }

    /// Fetch an order by id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no such order exists.
    pub async fn get(&self, id: &OrderId) -> Result<Order, OrderError> {
        let doc = self.store.get(ORDERS, id.as_str()).await?;
        Ok(decode(ORDERS, id.as_str(), doc)?)
    }

    /// List a user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Malformed` if any persisted order fails to
    /// decode.
    pub async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Order>, OrderError> {
        let docs = self
            .store
            .find_by(ORDERS, "user_id", &json!(user_id.as_str()))
            .await?;
        let mut orders = docs
            .into_iter()
            .map(|doc| {
                // Error context names the order document, not the query key
                let order_id = doc
                    .get("id")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_owned();
                decode::<Order>(ORDERS, &order_id, doc)
            })
            .collect::<Result<Vec<_>, _>>()?;
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    /// Advance an order's status, enforcing the transition table.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::InvalidTransition` if the state machine does
    /// not permit the move; the stored order is left untouched.
    pub async fn update_status(&self, id: &OrderId, to: OrderStatus) -> Result<Order, OrderError> {
        let doc = self
            .store
            .update_with::<OrderError, _>(ORDERS, id.as_str(), |doc| {
                let mut order: Order = decode(ORDERS, id.as_str(), doc.take())?;
                if !order.status.can_transition_to(to) {
                    return Err(OrderError::InvalidTransition {
                        from: order.status,
                        to,
                    });
                }
                order.status = to;
                *doc = encode(ORDERS, id.as_str(), &order)?;
                Ok(())
            })
            .await?;
        Ok(decode(ORDERS, id.as_str(), doc)?)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use atelier_core::{Money, PaymentMethodKind, ProductId};

    use super::*;
    use crate::models::{Address, OrderLine};
    use crate::store::InMemoryStore;

    fn sample_order(id: &str, user: &str) -> Order {
        Order {
            id: OrderId::new(id),
            user_id: UserId::new(user),
            lines: vec![OrderLine {
                product_id: ProductId::new("p1"),
                name: "Linen Shirt".to_owned(),
                brand: "Atelier".to_owned(),
                image: String::new(),
                size: "M".to_owned(),
                unit_price: Money::from_major(1000),
                quantity: 2,
            }],
            items_count: 2,
            subtotal: Money::from_major(2000),
            shipping: Money::from_major(499),
            discount: Money::ZERO,
            total: Money::from_major(2499),
            address: Address {
                recipient: "A. Customer".to_owned(),
                street: "12 Mill Road".to_owned(),
                city: "Pune".to_owned(),
                state: "MH".to_owned(),
                postal_code: "411001".to_owned(),
                phone: "9900112233".to_owned(),
            },
            payment_method: PaymentMethodKind::CashOnDelivery,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_and_get_round_trip() {
        let store = InMemoryStore::new();
        let repo = OrderRepository::new(&store);
        let order = sample_order("o1", "u1");
        repo.create(&order).await.unwrap();
        let fetched = repo.get(&order.id).await.unwrap();
        assert_eq!(fetched, order);
    }

    #[tokio::test]
    async fn test_duplicate_create_conflicts() {
        let store = InMemoryStore::new();
        let repo = OrderRepository::new(&store);
        let order = sample_order("o1", "u1");
        repo.create(&order).await.unwrap();
        let err = repo.create(&order).await.unwrap_err();
        assert!(matches!(err, OrderError::Store(StoreError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_list_for_user_newest_first() {
        let store = InMemoryStore::new();
        let repo = OrderRepository::new(&store);

        let mut first = sample_order("o1", "u1");
        first.created_at = Utc::now() - chrono::Duration::hours(2);
        let second = sample_order("o2", "u1");
        let other_user = sample_order("o3", "u2");

        repo.create(&first).await.unwrap();
        repo.create(&second).await.unwrap();
        repo.create(&other_user).await.unwrap();

        let orders = repo.list_for_user(&UserId::new("u1")).await.unwrap();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].id, OrderId::new("o2"));
        assert_eq!(orders[1].id, OrderId::new("o1"));
    }

    #[tokio::test]
    async fn test_list_for_user_names_the_malformed_order() {
        let store = InMemoryStore::new();
        store
            .create(
                ORDERS,
                "o-broken",
                json!({"id": "o-broken", "user_id": "u1"}),
            )
            .await
            .unwrap();
        let repo = OrderRepository::new(&store);

        let err = repo.list_for_user(&UserId::new("u1")).await.unwrap_err();
        match err {
            OrderError::Store(StoreError::Malformed { id, .. }) => assert_eq!(id, "o-broken"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_update_status_enforces_machine() {
        let store = InMemoryStore::new();
        let repo = OrderRepository::new(&store);
        let order = sample_order("o1", "u1");
        repo.create(&order).await.unwrap();

        let order = repo
            .update_status(&order.id, OrderStatus::Processing)
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::Processing);

        let order = repo
            .update_status(&order.id, OrderStatus::Shipped)
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::Shipped);

        // Cancellation after shipping is rejected and nothing changes
        let err = repo
            .update_status(&order.id, OrderStatus::Cancelled)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::InvalidTransition { .. }));
        let unchanged = repo.get(&order.id).await.unwrap();
        assert_eq!(unchanged.status, OrderStatus::Shipped);
    }
}
