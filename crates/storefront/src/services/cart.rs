//! Cart reconciliation service.
//!
//! Both screens go through this one service, so the same normalization is
//! applied on every read from and every write to the store. Edits follow
//! "compute new sequence, persist, then present the persisted result":
//! handlers render what was written, never a locally patched copy.
//!
//! Writes carry the revision the cart was read at. When another writer (a
//! second tab, a second device) got there first, the store rejects the stale
//! write; the edit is then re-applied to the fresh document instead of
//! overwriting the concurrent change. The retry budget is small - after that
//! the operation fails like any other store fault.

use std::sync::Arc;

use tracing::debug;

use copperleaf_core::{Cart, ItemId, Quantity, UserId};

use crate::store::{CartRepository, DocumentStore, StoreError, VersionedCart};

/// Attempts per edit before giving up on revision conflicts.
const MAX_WRITE_ATTEMPTS: u32 = 3;

/// Loads, edits, and persists user carts.
#[derive(Clone)]
pub struct CartService {
    store: Arc<dyn DocumentStore>,
}

impl CartService {
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Load a user's cart, normalized.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the document read fails.
    pub async fn load(&self, user: &UserId) -> Result<Cart, StoreError> {
        let repository = CartRepository::new(self.store.as_ref());
        Ok(repository.load(user).await?.cart)
    }

    /// Apply a pure edit to the persisted cart and return what was written.
    ///
    /// The edit runs against the freshly loaded cart, and the write is
    /// preconditioned on the revision that load observed. On a revision
    /// conflict the edit is re-applied to the new state of the document, up
    /// to [`MAX_WRITE_ATTEMPTS`] times.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` when the retry budget is exhausted, or
    /// any other `StoreError` from the underlying reads and writes.
    pub async fn apply<F>(&self, user: &UserId, edit: F) -> Result<Cart, StoreError>
    where
        F: Fn(&Cart) -> Cart + Send + Sync,
    {
        let repository = CartRepository::new(self.store.as_ref());

        for attempt in 1..=MAX_WRITE_ATTEMPTS {
            let VersionedCart { cart, revision } = repository.load(user).await?;
            let next = edit(&cart);

            match repository.save(user, &next, revision.as_ref()).await {
                Ok(_) => return Ok(next),
                Err(StoreError::Conflict) if attempt < MAX_WRITE_ATTEMPTS => {
                    debug!(user = %user, attempt, "cart write conflicted, retrying");
                }
                Err(e) => return Err(e),
            }
        }

        Err(StoreError::Conflict)
    }

    /// Increment the matching line's quantity by one.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the read-edit-write cycle fails.
    pub async fn increase(&self, user: &UserId, id: &ItemId) -> Result<Cart, StoreError> {
        self.apply(user, |cart| cart.with_increased(id)).await
    }

    /// Decrement the matching line's quantity, removing it at zero.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the read-edit-write cycle fails.
    pub async fn decrease(&self, user: &UserId, id: &ItemId) -> Result<Cart, StoreError> {
        self.apply(user, |cart| cart.with_decreased(id)).await
    }

    /// Remove the matching line outright.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the read-edit-write cycle fails.
    pub async fn remove(&self, user: &UserId, id: &ItemId) -> Result<Cart, StoreError> {
        self.apply(user, |cart| cart.without(id)).await
    }

    /// Set the matching line's quantity.
    ///
    /// Callers are expected to have rejected quantities below 1 already;
    /// [`Quantity`] makes them unrepresentable here.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the read-edit-write cycle fails.
    pub async fn set_quantity(
        &self,
        user: &UserId,
        id: &ItemId,
        quantity: Quantity,
    ) -> Result<Cart, StoreError> {
        self.apply(user, |cart| cart.with_quantity(id, quantity))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Document, MemoryDocumentStore, Revision};
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use serde_json::{Map, Value, json};
    use std::sync::atomic::{AtomicU32, Ordering};

    fn seed_fields(value: Value) -> Map<String, Value> {
        value.as_object().expect("object").clone()
    }

    async fn seeded_store(user: &str, cart: Value) -> Arc<MemoryDocumentStore> {
        let store = Arc::new(MemoryDocumentStore::new());
        store
            .set(user, seed_fields(json!({ "cart": cart })), false)
            .await
            .expect("seed");
        store
    }

    #[tokio::test]
    async fn load_of_absent_document_is_empty() {
        let service = CartService::new(Arc::new(MemoryDocumentStore::new()));
        let cart = service.load(&UserId::new("u-1")).await.expect("load");
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn load_normalizes_legacy_fields() {
        let store = seeded_store(
            "u-1",
            json!([{"id": 1, "price": "100", "quantity": "2"}]),
        )
        .await;
        let service = CartService::new(store);

        let cart = service.load(&UserId::new("u-1")).await.expect("load");
        assert_eq!(cart.subtotal(), Decimal::from(200));
    }

    #[tokio::test]
    async fn decrease_walks_a_line_down_to_removal() {
        let store = seeded_store(
            "u-1",
            json!([{"id": 1, "price": "100", "quantity": "2"}]),
        )
        .await;
        let service = CartService::new(store);
        let user = UserId::new("u-1");
        let id = ItemId::new("1");

        let once = service.decrease(&user, &id).await.expect("decrease");
        assert_eq!(once.subtotal(), Decimal::from(100));
        assert_eq!(once.items()[0].quantity.get(), 1);

        let twice = service.decrease(&user, &id).await.expect("decrease");
        assert!(twice.is_empty());
        assert_eq!(twice.subtotal(), Decimal::ZERO);

        // Persisted state matches what was returned.
        let persisted = service.load(&user).await.expect("load");
        assert!(persisted.is_empty());
    }

    #[tokio::test]
    async fn edits_on_unknown_ids_persist_the_sequence_unchanged() {
        let store = seeded_store(
            "u-1",
            json!([{"id": "a", "price": 10, "quantity": 2}]),
        )
        .await;
        let service = CartService::new(store);
        let user = UserId::new("u-1");

        let before = service.load(&user).await.expect("load");
        let after = service
            .increase(&user, &ItemId::new("ghost"))
            .await
            .expect("increase");
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn first_write_creates_the_document() {
        let store = Arc::new(MemoryDocumentStore::new());
        let service = CartService::new(Arc::clone(&store) as Arc<dyn DocumentStore>);
        let user = UserId::new("fresh");

        // Editing an empty, never-persisted cart writes an (empty) document.
        let cart = service
            .remove(&user, &ItemId::new("anything"))
            .await
            .expect("remove");
        assert!(cart.is_empty());
        assert!(store.get("fresh").await.expect("get").is_some());
    }

    #[tokio::test]
    async fn read_fault_propagates_without_writing() {
        let store = Arc::new(MemoryDocumentStore::new());
        store.fail_reads(true);
        let service = CartService::new(Arc::clone(&store) as Arc<dyn DocumentStore>);

        let result = service
            .increase(&UserId::new("u-1"), &ItemId::new("a"))
            .await;
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
    }

    /// Store that simulates a concurrent writer sneaking in between this
    /// caller's read and write, a fixed number of times.
    struct RacingStore {
        inner: Arc<MemoryDocumentStore>,
        races_left: AtomicU32,
    }

    impl RacingStore {
        fn new(inner: Arc<MemoryDocumentStore>, races: u32) -> Self {
            Self {
                inner,
                races_left: AtomicU32::new(races),
            }
        }
    }

    #[async_trait]
    impl DocumentStore for RacingStore {
        async fn get(&self, key: &str) -> Result<Option<Document>, StoreError> {
            self.inner.get(key).await
        }

        async fn update(
            &self,
            key: &str,
            fields: Map<String, Value>,
            expected: Option<&Revision>,
        ) -> Result<Revision, StoreError> {
            if self
                .races_left
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                // Another device appends a line before our write lands; the
                // cart field is replaced wholesale, so it writes the full
                // sequence it read plus its own line.
                self.inner
                    .update(
                        key,
                        seed_fields(json!({"cart": [
                            {"id": "mine", "price": 10, "quantity": 1},
                            {"id": "theirs", "price": 5, "quantity": 1},
                        ]})),
                        None,
                    )
                    .await?;
            }
            self.inner.update(key, fields, expected).await
        }

        async fn set(
            &self,
            key: &str,
            fields: Map<String, Value>,
            merge: bool,
        ) -> Result<Revision, StoreError> {
            self.inner.set(key, fields, merge).await
        }
    }

    #[tokio::test]
    async fn conflicting_write_is_retried_against_the_fresh_document() {
        let inner = seeded_store(
            "u-1",
            json!([{"id": "mine", "price": 10, "quantity": 1}]),
        )
        .await;
        let store = Arc::new(RacingStore::new(Arc::clone(&inner), 1));
        let service = CartService::new(store);
        let user = UserId::new("u-1");

        let cart = service
            .increase(&user, &ItemId::new("mine"))
            .await
            .expect("increase");

        // The retry re-read the document, so the concurrent line survived
        // alongside our edit.
        assert_eq!(cart.len(), 2);
        assert!(cart.items().iter().any(|item| item.id == ItemId::new("theirs")));
        assert!(
            cart.items()
                .iter()
                .any(|item| item.id == ItemId::new("mine") && item.quantity.get() == 2)
        );
    }

    #[tokio::test]
    async fn exhausted_retries_surface_as_conflict() {
        let inner = seeded_store(
            "u-1",
            json!([{"id": "mine", "price": 10, "quantity": 1}]),
        )
        .await;
        // More races than the retry budget.
        let store = Arc::new(RacingStore::new(Arc::clone(&inner), 10));
        let service = CartService::new(store);

        let result = service
            .increase(&UserId::new("u-1"), &ItemId::new("mine"))
            .await;
        assert!(matches!(result, Err(StoreError::Conflict)));

        // This caller's edit never landed.
        let persisted = CartService::new(inner)
            .load(&UserId::new("u-1"))
            .await
            .expect("load");
        assert!(
            persisted
                .items()
                .iter()
                .all(|item| item.id != ItemId::new("mine") || item.quantity.get() == 1)
        );
    }
}
