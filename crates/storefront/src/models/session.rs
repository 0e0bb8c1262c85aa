//! Session-related types.
//!
//! Types stored in the session: the authenticated identity and the two
//! pieces of ephemeral navigation context the checkout flow carries between
//! screens (neither is ever written to the document store).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use copperleaf_core::{CartItem, UserId};

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Stable user ID issued by the identity service.
    pub uid: UserId,
}

/// Cart-and-total snapshot handed to the downstream checkout step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutHandoff {
    /// Line items at the moment of handoff.
    pub items: Vec<CartItem>,
    /// Derived total at the moment of handoff.
    pub total: Decimal,
}

/// Session keys for storefront data.
pub mod session_keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the single buy-now product, when checkout was entered from a
    /// product page rather than the cart.
    pub const BUY_NOW_PRODUCT: &str = "buy_now_product";

    /// Key for the checkout handoff snapshot.
    pub const CHECKOUT_HANDOFF: &str = "checkout_handoff";
}
