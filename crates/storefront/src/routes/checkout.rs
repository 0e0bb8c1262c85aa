//! Checkout summary route handlers.
//!
//! The summary screen requires an authenticated identity. Its checkout set
//! is either a single buy-now product carried in the session (ephemeral, the
//! persisted cart is never touched) or the persisted cart itself. Quantity
//! edits persist first and render from the persisted result.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use tower_sessions::Session;
use tracing::instrument;

use copperleaf_core::{CartItem, ItemId, Price, Quantity};

use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::{CheckoutHandoff, session_keys};
use crate::routes::cart::{CartItemView, format_price};
use crate::state::AppState;

/// Checkout display data for templates.
#[derive(Clone)]
pub struct CheckoutView {
    pub items: Vec<CartItemView>,
    pub total: String,
    /// True when checking out a single buy-now product.
    pub buy_now: bool,
}

impl CheckoutView {
    fn from_items(items: &[CartItem], buy_now: bool) -> Self {
        let total: Decimal = items.iter().map(CartItem::line_total).sum();
        Self {
            items: items.iter().map(CartItemView::from).collect(),
            total: format_price(total),
            buy_now,
        }
    }
}

// =============================================================================
// Form Types
// =============================================================================

/// Buy-now form data, posted from a product page.
///
/// Price and quantity arrive as free-form strings and go through the same
/// coercion as persisted cart fields.
#[derive(Debug, Deserialize)]
pub struct BuyNowForm {
    pub item_id: String,
    pub name: String,
    pub price: String,
    pub quantity: Option<String>,
    pub image: Option<String>,
}

/// Quantity update form data.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantityForm {
    pub item_id: String,
    pub quantity: i64,
}

// =============================================================================
// Templates
// =============================================================================

/// Checkout summary page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutShowTemplate {
    pub checkout: CheckoutView,
}

/// Checkout items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/checkout_items.html")]
pub struct CheckoutItemsTemplate {
    pub checkout: CheckoutView,
}

/// Order confirmation page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/confirmation.html")]
pub struct ConfirmationTemplate;

/// Downstream checkout details page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/details.html")]
pub struct DetailsTemplate {
    pub items: Vec<CartItemView>,
    pub total: String,
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Get the buy-now product from the session, if checkout was entered from a
/// product page.
async fn buy_now_product(session: &Session) -> Option<CartItem> {
    session
        .get::<CartItem>(session_keys::BUY_NOW_PRODUCT)
        .await
        .ok()
        .flatten()
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the checkout summary.
///
/// A buy-now product in the session is the entire checkout set and the
/// persisted cart is not read. A store read fault degrades to an empty
/// summary.
#[instrument(skip(state, session, user))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> impl IntoResponse {
    if let Some(product) = buy_now_product(&session).await {
        return CheckoutShowTemplate {
            checkout: CheckoutView::from_items(std::slice::from_ref(&product), true),
        };
    }

    let checkout = match state.cart_service().load(&user.uid).await {
        Ok(cart) => CheckoutView::from_items(cart.items(), false),
        Err(e) => {
            tracing::warn!("Failed to fetch cart for checkout: {e}");
            CheckoutView::from_items(&[], false)
        }
    };

    CheckoutShowTemplate { checkout }
}

/// Enter checkout with a single product (buy now).
///
/// The product is held in the session only; nothing is written to the
/// document store.
#[instrument(skip(session))]
pub async fn buy_now(session: Session, Form(form): Form<BuyNowForm>) -> Response {
    let item = CartItem {
        id: ItemId::new(form.item_id),
        name: form.name,
        price: Price::coerce(&Value::String(form.price)),
        quantity: Quantity::coerce(&Value::String(form.quantity.unwrap_or_default())),
        image: form.image.filter(|url| !url.is_empty()),
    };

    if let Err(e) = session.insert(session_keys::BUY_NOW_PRODUCT, &item).await {
        tracing::error!("Failed to store buy-now product in session: {e}");
        return AppError::Session(e).into_response();
    }

    Redirect::to("/checkout").into_response()
}

/// Update a line's quantity (HTMX).
///
/// Quantities below 1 are rejected as a no-op: nothing is persisted and
/// `204 No Content` leaves the rendered summary untouched. This screen never
/// auto-removes a line; removal belongs to the cart screen.
#[instrument(skip(state, session, user))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(form): Form<UpdateQuantityForm>,
) -> Response {
    let Ok(quantity) = u32::try_from(form.quantity) else {
        return StatusCode::NO_CONTENT.into_response();
    };
    if quantity < 1 {
        return StatusCode::NO_CONTENT.into_response();
    }
    let quantity = Quantity::new(quantity);
    let id = ItemId::new(form.item_id);

    // Buy-now mode: the checkout set lives in the session and the persisted
    // cart must stay untouched.
    if let Some(product) = buy_now_product(&session).await {
        let updated = if product.id == id {
            CartItem { quantity, ..product }
        } else {
            product
        };

        if let Err(e) = session
            .insert(session_keys::BUY_NOW_PRODUCT, &updated)
            .await
        {
            tracing::error!("Failed to update buy-now product in session: {e}");
            return StatusCode::NO_CONTENT.into_response();
        }

        return CheckoutItemsTemplate {
            checkout: CheckoutView::from_items(std::slice::from_ref(&updated), true),
        }
        .into_response();
    }

    match state
        .cart_service()
        .set_quantity(&user.uid, &id, quantity)
        .await
    {
        Ok(cart) => (
            AppendHeaders([("HX-Trigger", "cart-updated")]),
            CheckoutItemsTemplate {
                checkout: CheckoutView::from_items(cart.items(), false),
            },
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to update quantity of {id}: {e}");
            StatusCode::NO_CONTENT.into_response()
        }
    }
}

/// Proceed to pay: terminal stub.
///
/// No payment authorization, no stock decrement, no order record - the flow
/// announces success and lands on the confirmation page.
#[instrument(skip(session, user))]
pub async fn pay(session: Session, RequireAuth(user): RequireAuth) -> Response {
    tracing::info!(uid = %user.uid, "payment stub accepted");

    // The buy-now context is finished either way.
    if let Err(e) = session
        .remove::<CartItem>(session_keys::BUY_NOW_PRODUCT)
        .await
    {
        tracing::warn!("Failed to clear buy-now product: {e}");
    }

    Redirect::to("/checkout/confirmation").into_response()
}

/// Order confirmation page.
#[instrument(skip_all)]
pub async fn confirmation(RequireAuth(_user): RequireAuth) -> impl IntoResponse {
    ConfirmationTemplate
}

/// Hand the current checkout set to the downstream step.
///
/// Snapshots the items and derived total into the session as navigation
/// context. Deliberately no validation that the set is non-empty.
#[instrument(skip(state, session, user))]
pub async fn proceed(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<Response, AppError> {
    let items: Vec<CartItem> = if let Some(product) = buy_now_product(&session).await {
        vec![product]
    } else {
        match state.cart_service().load(&user.uid).await {
            Ok(cart) => cart.items().to_vec(),
            Err(e) => {
                tracing::warn!("Failed to fetch cart for handoff: {e}");
                Vec::new()
            }
        }
    };

    let handoff = CheckoutHandoff {
        total: items.iter().map(CartItem::line_total).sum(),
        items,
    };
    session
        .insert(session_keys::CHECKOUT_HANDOFF, &handoff)
        .await?;

    Ok(Redirect::to("/checkout/details").into_response())
}

/// Downstream checkout step: renders the handed-off snapshot read-only.
#[instrument(skip_all)]
pub async fn details(session: Session, RequireAuth(_user): RequireAuth) -> Response {
    let Some(handoff) = session
        .get::<CheckoutHandoff>(session_keys::CHECKOUT_HANDOFF)
        .await
        .ok()
        .flatten()
    else {
        return Redirect::to("/checkout").into_response();
    };

    DetailsTemplate {
        items: handoff.items.iter().map(CartItemView::from).collect(),
        total: format_price(handoff.total),
    }
    .into_response()
}
