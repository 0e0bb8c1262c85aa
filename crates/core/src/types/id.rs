//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_string_id!` macro to create type-safe ID wrappers that
//! prevent accidentally mixing IDs from different entity types. Both IDs in
//! this crate originate in external systems (the identity service issues user
//! IDs, the product catalog issues item IDs), so they wrap opaque strings
//! rather than database integers.

use serde::{Deserialize, Serialize};

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_str()`
/// - `From<String>` and `From<&str>` implementations
///
/// # Example
///
/// ```rust
/// # use copperleaf_core::define_string_id;
/// define_string_id!(UserId);
/// define_string_id!(ItemId);
///
/// let user_id = UserId::new("u-9f2c");
/// let item_id = ItemId::new("sku-118");
///
/// // These are different types, so this won't compile:
/// // let _: UserId = item_id;
/// ```
#[macro_export]
macro_rules! define_string_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a string value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

// Define standard entity IDs
define_string_id!(UserId);
define_string_id!(ItemId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_distinct_types() {
        let user = UserId::new("u-1");
        let item = ItemId::new("u-1");
        assert_eq!(user.as_str(), item.as_str());
    }

    #[test]
    fn id_serializes_transparently() {
        let id = ItemId::new("sku-7");
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "\"sku-7\"");

        let back: ItemId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, id);
    }
}
