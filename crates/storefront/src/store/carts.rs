//! Cart repository over the document store.
//!
//! One document per user; the cart lives under the `cart` field as an array
//! of line items. Reads tolerate legacy-malformed entries: the field may be
//! missing, may not be an array, and individual entries may not be objects.
//! Anything unusable degrades to its default rather than failing the read.

use serde_json::{Map, Value};

use copperleaf_core::{Cart, RawCartItem, UserId};

use super::{DocumentStore, Revision, StoreError};

/// Name of the document field holding the cart sequence.
const CART_FIELD: &str = "cart";

/// A cart together with the document revision it was read at.
#[derive(Debug, Clone)]
pub struct VersionedCart {
    /// Normalized cart contents.
    pub cart: Cart,
    /// Revision of the backing document; `None` when the document does not
    /// exist yet.
    pub revision: Option<Revision>,
}

/// Repository for cart document operations.
pub struct CartRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Load a user's cart, normalizing every persisted item.
    ///
    /// An absent document, an absent `cart` field, or a non-array `cart`
    /// field all read as the empty cart.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the underlying document read fails.
    pub async fn load(&self, user: &UserId) -> Result<VersionedCart, StoreError> {
        let Some(document) = self.store.get(user.as_str()).await? else {
            return Ok(VersionedCart {
                cart: Cart::empty(),
                revision: None,
            });
        };

        let raw = document
            .fields
            .get(CART_FIELD)
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| {
                        serde_json::from_value::<RawCartItem>(entry.clone()).ok()
                    })
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        Ok(VersionedCart {
            cart: Cart::from_raw(&raw),
            revision: Some(document.revision),
        })
    }

    /// Persist a full cart sequence, merge-writing the `cart` field.
    ///
    /// With `expected` set, the write is rejected with
    /// [`StoreError::Conflict`] if the document moved past that revision;
    /// without it, the write creates the document if needed (carts come into
    /// existence on first write).
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if serialization or the document write fails.
    pub async fn save(
        &self,
        user: &UserId,
        cart: &Cart,
        expected: Option<&Revision>,
    ) -> Result<Revision, StoreError> {
        let mut fields = Map::new();
        fields.insert(CART_FIELD.to_string(), serde_json::to_value(cart)?);

        self.store.update(user.as_str(), fields, expected).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryDocumentStore;
    use copperleaf_core::ItemId;
    use rust_decimal::Decimal;
    use serde_json::json;

    fn seed(value: Value) -> Map<String, Value> {
        value.as_object().expect("object").clone()
    }

    #[tokio::test]
    async fn absent_document_loads_as_empty_cart() {
        let store = MemoryDocumentStore::new();
        let repo = CartRepository::new(&store);

        let loaded = repo.load(&UserId::new("u-1")).await.expect("load");
        assert!(loaded.cart.is_empty());
        assert!(loaded.revision.is_none());
    }

    #[tokio::test]
    async fn missing_or_malformed_cart_field_loads_as_empty() {
        let store = MemoryDocumentStore::new();
        store
            .set("u-1", seed(json!({"displayName": "Ida"})), false)
            .await
            .expect("seed");
        store
            .set("u-2", seed(json!({"cart": "oops"})), false)
            .await
            .expect("seed");

        let repo = CartRepository::new(&store);
        assert!(repo.load(&UserId::new("u-1")).await.expect("load").cart.is_empty());
        assert!(repo.load(&UserId::new("u-2")).await.expect("load").cart.is_empty());
    }

    #[tokio::test]
    async fn load_normalizes_legacy_entries_and_skips_non_objects() {
        let store = MemoryDocumentStore::new();
        store
            .set(
                "u-1",
                seed(json!({"cart": [
                    {"id": 1, "name": "Brass Lamp", "price": "100", "quantity": "2"},
                    "not-an-item",
                    {"name": "no id"},
                ]})),
                false,
            )
            .await
            .expect("seed");

        let repo = CartRepository::new(&store);
        let loaded = repo.load(&UserId::new("u-1")).await.expect("load");

        assert_eq!(loaded.cart.len(), 1);
        let item = &loaded.cart.items()[0];
        assert_eq!(item.id, ItemId::new("1"));
        assert_eq!(item.price.amount(), Decimal::from(100));
        assert_eq!(item.quantity.get(), 2);
    }

    #[tokio::test]
    async fn save_round_trips_and_preserves_other_fields() {
        let store = MemoryDocumentStore::new();
        store
            .set("u-1", seed(json!({"displayName": "Ida"})), false)
            .await
            .expect("seed");

        let repo = CartRepository::new(&store);
        let loaded = repo.load(&UserId::new("u-1")).await.expect("load");
        let cart = Cart::from_raw(&[serde_json::from_value(
            json!({"id": "a", "name": "Rug", "price": 75, "quantity": 2}),
        )
        .expect("raw item")]);

        repo.save(&UserId::new("u-1"), &cart, loaded.revision.as_ref())
            .await
            .expect("save");

        let reloaded = repo.load(&UserId::new("u-1")).await.expect("reload");
        assert_eq!(reloaded.cart, cart);

        // Merge write left unrelated fields alone.
        let doc = store.get("u-1").await.expect("get").expect("document");
        assert_eq!(doc.fields["displayName"], json!("Ida"));
    }
}
