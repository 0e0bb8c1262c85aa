//! Cart line items and sequence operations.
//!
//! A cart is an ordered sequence of line items persisted wholesale under the
//! owning user's document. Persisted items may be legacy-malformed (numeric
//! fields stored as strings, fields missing entirely), so reads go through
//! [`RawCartItem`] and [`Cart::from_raw`], which apply one normalization
//! policy for the whole application. Mutations are pure: each returns the new
//! sequence and the caller persists it before presenting it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{ItemId, Price, Quantity};

/// A cart line item as it appears in the document store.
///
/// Every field is loosely typed; nothing about a persisted document is
/// trusted until it has passed through [`Cart::from_raw`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawCartItem {
    /// Item identifier; numbers and strings are accepted.
    #[serde(default)]
    pub id: Value,
    /// Display name.
    #[serde(default)]
    pub name: Value,
    /// Unit price; numbers and numeric strings are accepted.
    #[serde(default)]
    pub price: Value,
    /// Quantity; numbers and numeric strings are accepted.
    #[serde(default)]
    pub quantity: Value,
    /// Image URL. Stored as `img` for compatibility with existing documents.
    #[serde(default, rename = "img")]
    pub image: Value,
}

/// A normalized cart line item.
///
/// Invariants: `price` is non-negative, `quantity` is a positive integer.
/// Serializes back to the persisted document shape (`img` field name).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Identifier, unique within the cart.
    pub id: ItemId,
    /// Display name.
    pub name: String,
    /// Unit price.
    pub price: Price,
    /// Quantity, always >= 1.
    pub quantity: Quantity,
    /// Image URL, if the catalog provided one.
    #[serde(rename = "img", skip_serializing_if = "Option::is_none", default)]
    pub image: Option<String>,
}

impl CartItem {
    /// Normalize a raw persisted item.
    ///
    /// Returns `None` when the item carries no usable identifier; such an
    /// item could never be addressed by any cart operation.
    #[must_use]
    pub fn from_raw(raw: &RawCartItem) -> Option<Self> {
        let id = coerce_id(&raw.id)?;

        Some(Self {
            id,
            name: coerce_name(&raw.name),
            price: Price::coerce(&raw.price),
            quantity: Quantity::coerce(&raw.quantity),
            image: coerce_image(&raw.image),
        })
    }

    /// Price times quantity for this line.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price.amount() * Decimal::from(self.quantity.get())
    }
}

/// Coerce an identifier value. Numbers become their decimal string form so
/// that documents written before identifiers were stringified keep working.
fn coerce_id(value: &Value) -> Option<ItemId> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(ItemId::new(s.trim())),
        Value::Number(n) => Some(ItemId::new(n.to_string())),
        _ => None,
    }
}

fn coerce_name(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

fn coerce_image(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// An ordered sequence of normalized cart line items.
///
/// All mutating operations return the resulting cart; the caller persists it
/// and renders from the persisted result. An identifier that matches no line
/// leaves the sequence unchanged, order preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// The empty cart.
    #[must_use]
    pub const fn empty() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from normalized items, deduplicating identifiers.
    #[must_use]
    pub fn new(items: Vec<CartItem>) -> Self {
        let mut deduped: Vec<CartItem> = Vec::with_capacity(items.len());
        for item in items {
            if !deduped.iter().any(|existing| existing.id == item.id) {
                deduped.push(item);
            }
        }
        Self { items: deduped }
    }

    /// Normalize a raw persisted sequence.
    ///
    /// Items without an identifier are dropped; duplicated identifiers keep
    /// the first occurrence; every numeric field is coerced to its invariant
    /// form. Order is preserved.
    #[must_use]
    pub fn from_raw(raw: &[RawCartItem]) -> Self {
        Self::new(raw.iter().filter_map(CartItem::from_raw).collect())
    }

    /// The line items, in order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Total number of units across all lines, for the header badge.
    #[must_use]
    pub fn unit_count(&self) -> u64 {
        self.items
            .iter()
            .map(|item| u64::from(item.quantity.get()))
            .sum()
    }

    /// Sum of price times quantity over all lines.
    ///
    /// Decimal arithmetic over normalized fields: a malformed document can
    /// only ever contribute its defaults, never a non-numeric total.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Increment the matching line's quantity by one.
    #[must_use]
    pub fn with_increased(&self, id: &ItemId) -> Self {
        Self {
            items: self
                .items
                .iter()
                .map(|item| {
                    if item.id == *id {
                        CartItem {
                            quantity: item.quantity.increment(),
                            ..item.clone()
                        }
                    } else {
                        item.clone()
                    }
                })
                .collect(),
        }
    }

    /// Decrement the matching line's quantity by one, removing the line when
    /// it would reach zero.
    ///
    /// Removal happens in the same operation as the decrement so a
    /// zero-quantity line is never observable.
    #[must_use]
    pub fn with_decreased(&self, id: &ItemId) -> Self {
        Self {
            items: self
                .items
                .iter()
                .filter_map(|item| {
                    if item.id == *id {
                        item.quantity.decrement().map(|quantity| CartItem {
                            quantity,
                            ..item.clone()
                        })
                    } else {
                        Some(item.clone())
                    }
                })
                .collect(),
        }
    }

    /// Remove the matching line outright.
    #[must_use]
    pub fn without(&self, id: &ItemId) -> Self {
        Self {
            items: self
                .items
                .iter()
                .filter(|item| item.id != *id)
                .cloned()
                .collect(),
        }
    }

    /// Set the matching line's quantity.
    #[must_use]
    pub fn with_quantity(&self, id: &ItemId, quantity: Quantity) -> Self {
        Self {
            items: self
                .items
                .iter()
                .map(|item| {
                    if item.id == *id {
                        CartItem {
                            quantity,
                            ..item.clone()
                        }
                    } else {
                        item.clone()
                    }
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawCartItem {
        serde_json::from_value(value).expect("raw cart item")
    }

    fn cart(values: Vec<Value>) -> Cart {
        let raw_items: Vec<RawCartItem> = values.into_iter().map(raw).collect();
        Cart::from_raw(&raw_items)
    }

    #[test]
    fn normalization_applies_defaults() {
        let cart = cart(vec![
            json!({"id": "a", "name": "Brass Lamp"}),
            json!({"id": "b", "name": "Rug", "price": "oops", "quantity": "many"}),
        ]);

        for item in cart.items() {
            assert_eq!(item.price, Price::ZERO);
            assert_eq!(item.quantity, Quantity::ONE);
        }
    }

    #[test]
    fn normalization_coerces_numeric_strings() {
        let cart = cart(vec![json!({"id": 1, "price": "100", "quantity": "2"})]);

        let item = &cart.items()[0];
        assert_eq!(item.id, ItemId::new("1"));
        assert_eq!(item.price.amount(), Decimal::from(100));
        assert_eq!(item.quantity.get(), 2);
        assert_eq!(cart.subtotal(), Decimal::from(200));
    }

    #[test]
    fn items_without_identifiers_are_dropped() {
        let cart = cart(vec![
            json!({"name": "orphan", "price": 10}),
            json!({"id": "", "price": 10}),
            json!({"id": "keep", "price": 10}),
        ]);

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].id, ItemId::new("keep"));
    }

    #[test]
    fn duplicate_identifiers_keep_first_occurrence() {
        let cart = cart(vec![
            json!({"id": "a", "price": 10, "quantity": 1}),
            json!({"id": "a", "price": 99, "quantity": 5}),
        ]);

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].price.amount(), Decimal::from(10));
    }

    #[test]
    fn subtotal_is_never_non_numeric() {
        let cart = cart(vec![
            json!({"id": "a", "price": "garbage", "quantity": null}),
            json!({"id": "b", "price": 50, "quantity": 3}),
            json!({"id": "c"}),
        ]);

        // garbage -> 0 x 1, plus 50 x 3, plus 0 x 1
        assert_eq!(cart.subtotal(), Decimal::from(150));
    }

    #[test]
    fn decrease_at_quantity_one_removes_the_line() {
        let cart = cart(vec![json!({"id": 1, "price": "100", "quantity": "2"})]);
        assert_eq!(cart.subtotal(), Decimal::from(200));

        let id = ItemId::new("1");
        let once = cart.with_decreased(&id);
        assert_eq!(once.items()[0].quantity.get(), 1);
        assert_eq!(once.subtotal(), Decimal::from(100));

        let twice = once.with_decreased(&id);
        assert!(twice.is_empty());
        assert_eq!(twice.subtotal(), Decimal::ZERO);
        assert!(twice.items().iter().all(|item| item.quantity.get() >= 1));
    }

    #[test]
    fn operations_on_unknown_ids_are_no_ops() {
        let cart = cart(vec![
            json!({"id": "a", "price": 10, "quantity": 2}),
            json!({"id": "b", "price": 20, "quantity": 1}),
        ]);
        let ghost = ItemId::new("ghost");

        assert_eq!(cart.with_increased(&ghost), cart);
        assert_eq!(cart.with_decreased(&ghost), cart);
        assert_eq!(cart.without(&ghost), cart);
        assert_eq!(cart.with_quantity(&ghost, Quantity::new(9)), cart);
    }

    #[test]
    fn increase_and_remove() {
        let cart = cart(vec![
            json!({"id": "a", "price": 10, "quantity": 2}),
            json!({"id": "b", "price": 20, "quantity": 1}),
        ]);

        let increased = cart.with_increased(&ItemId::new("a"));
        assert_eq!(increased.items()[0].quantity.get(), 3);
        assert_eq!(increased.items()[1].quantity.get(), 1);

        let removed = increased.without(&ItemId::new("a"));
        assert_eq!(removed.len(), 1);
        assert_eq!(removed.items()[0].id, ItemId::new("b"));
    }

    #[test]
    fn with_quantity_sets_only_the_matching_line() {
        let cart = cart(vec![
            json!({"id": "a", "price": 10, "quantity": 2}),
            json!({"id": "b", "price": 20, "quantity": 1}),
        ]);

        let updated = cart.with_quantity(&ItemId::new("b"), Quantity::new(4));
        assert_eq!(updated.items()[0].quantity.get(), 2);
        assert_eq!(updated.items()[1].quantity.get(), 4);
        assert_eq!(updated.subtotal(), Decimal::from(100));
    }

    #[test]
    fn unit_count_sums_quantities() {
        let cart = cart(vec![
            json!({"id": "a", "quantity": 2}),
            json!({"id": "b", "quantity": 3}),
        ]);
        assert_eq!(cart.unit_count(), 5);
    }

    #[test]
    fn round_trips_through_the_persisted_shape() {
        let cart = cart(vec![
            json!({"id": "a", "name": "Lamp", "price": "15.50", "quantity": 2, "img": "https://cdn.example/a.jpg"}),
        ]);

        let value = serde_json::to_value(&cart).expect("serialize");
        assert_eq!(value[0]["img"], json!("https://cdn.example/a.jpg"));
        assert_eq!(value[0]["price"], json!("15.50"));

        let raw_items: Vec<RawCartItem> =
            serde_json::from_value(value).expect("deserialize raw");
        assert_eq!(Cart::from_raw(&raw_items), cart);
    }
}
