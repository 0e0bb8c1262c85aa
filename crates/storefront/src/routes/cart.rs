//! Cart route handlers.
//!
//! Cart mutations use HTMX for dynamic updates without full page reloads.
//! Every mutation persists through the cart service first and re-renders
//! from the persisted result; on a store fault the endpoint answers
//! `204 No Content`, HTMX performs no swap, and the user keeps the
//! last-known-good rendering.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{AppendHeaders, IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use copperleaf_core::{Cart, CartItem, ItemId};

use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::CurrentUser;
use crate::state::AppState;

/// Cart item display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub id: String,
    pub name: String,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
    pub image: Option<String>,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub unit_count: u64,
}

impl CartView {
    /// Create an empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            subtotal: format_price(Decimal::ZERO),
            unit_count: 0,
        }
    }
}

// =============================================================================
// Type Conversions
// =============================================================================

/// Format a decimal amount as a display price.
pub fn format_price(amount: Decimal) -> String {
    format!("\u{20b9}{amount:.2}")
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.items().iter().map(CartItemView::from).collect(),
            subtotal: format_price(cart.subtotal()),
            unit_count: cart.unit_count(),
        }
    }
}

impl From<&CartItem> for CartItemView {
    fn from(item: &CartItem) -> Self {
        Self {
            id: item.id.to_string(),
            name: item.name.clone(),
            quantity: item.quantity.get(),
            price: format_price(item.price.amount()),
            line_price: format_price(item.line_total()),
            image: item.image.clone(),
        }
    }
}

/// Cart mutation form data (increase, decrease, remove).
#[derive(Debug, Deserialize)]
pub struct MutateCartForm {
    pub item_id: String,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u64,
}

/// Display cart page.
///
/// Without an authenticated identity the cart renders empty and the store is
/// never contacted. A store read fault degrades to the empty cart.
#[instrument(skip(state, user))]
pub async fn show(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
) -> impl IntoResponse {
    let cart = match user {
        Some(CurrentUser { uid }) => match state.cart_service().load(&uid).await {
            Ok(cart) => CartView::from(&cart),
            Err(e) => {
                tracing::warn!("Failed to fetch cart for {uid}: {e}");
                CartView::empty()
            }
        },
        None => CartView::empty(),
    };

    CartShowTemplate { cart }
}

/// Increase an item's quantity by one (HTMX).
#[instrument(skip(state, user))]
pub async fn increase(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Form(form): Form<MutateCartForm>,
) -> Response {
    let Some(CurrentUser { uid }) = user else {
        return StatusCode::NO_CONTENT.into_response();
    };

    let id = ItemId::new(form.item_id);
    match state.cart_service().increase(&uid, &id).await {
        Ok(cart) => items_fragment(&cart),
        Err(e) => {
            tracing::error!("Failed to increase quantity of {id}: {e}");
            StatusCode::NO_CONTENT.into_response()
        }
    }
}

/// Decrease an item's quantity by one, removing it at zero (HTMX).
///
/// The removal happens in the same persisted write as the decrement; a
/// zero-quantity row is never rendered.
#[instrument(skip(state, user))]
pub async fn decrease(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Form(form): Form<MutateCartForm>,
) -> Response {
    let Some(CurrentUser { uid }) = user else {
        return StatusCode::NO_CONTENT.into_response();
    };

    let id = ItemId::new(form.item_id);
    match state.cart_service().decrease(&uid, &id).await {
        Ok(cart) => items_fragment(&cart),
        Err(e) => {
            tracing::error!("Failed to decrease quantity of {id}: {e}");
            StatusCode::NO_CONTENT.into_response()
        }
    }
}

/// Remove an item from the cart (HTMX).
#[instrument(skip(state, user))]
pub async fn remove(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Form(form): Form<MutateCartForm>,
) -> Response {
    let Some(CurrentUser { uid }) = user else {
        return StatusCode::NO_CONTENT.into_response();
    };

    let id = ItemId::new(form.item_id);
    match state.cart_service().remove(&uid, &id).await {
        Ok(cart) => items_fragment(&cart),
        Err(e) => {
            tracing::error!("Failed to remove {id} from cart: {e}");
            StatusCode::NO_CONTENT.into_response()
        }
    }
}

/// Get cart count badge (HTMX).
#[instrument(skip(state, user))]
pub async fn count(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
) -> impl IntoResponse {
    let count = match user {
        Some(CurrentUser { uid }) => state
            .cart_service()
            .load(&uid)
            .await
            .map(|cart| cart.unit_count())
            .unwrap_or(0),
        None => 0,
    };

    CartCountTemplate { count }
}

/// Render the items fragment from a persisted cart, notifying the badge.
fn items_fragment(cart: &Cart) -> Response {
    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            cart: CartView::from(cart),
        },
    )
        .into_response()
}
