//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Redirect to the cart
//! GET  /health                 - Health check
//!
//! # Cart (HTMX fragments)
//! GET  /cart                   - Cart page
//! POST /cart/increase          - Increase quantity (returns cart_items fragment)
//! POST /cart/decrease          - Decrease quantity, removing at zero (fragment)
//! POST /cart/remove            - Remove item (fragment)
//! GET  /cart/count             - Cart count badge (fragment)
//!
//! # Checkout
//! GET  /checkout               - Checkout summary (requires auth)
//! POST /checkout/buy-now       - Enter checkout with a single product
//! POST /checkout/update        - Update quantity (returns checkout_items fragment)
//! POST /checkout/pay           - Payment stub, lands on confirmation
//! POST /checkout/continue      - Hand cart + total to the downstream step
//! GET  /checkout/details       - Downstream step rendering the handoff
//! GET  /checkout/confirmation  - Order confirmation
//!
//! # Auth
//! GET  /auth/login             - Login page
//! POST /auth/login             - Verify credentials via the identity service
//! POST /auth/logout            - Logout action
//! ```

pub mod auth;
pub mod cart;
pub mod checkout;

use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/increase", post(cart::increase))
        .route("/decrease", post(cart::decrease))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::show))
        .route("/buy-now", post(checkout::buy_now))
        .route("/update", post(checkout::update))
        .route("/pay", post(checkout::pay))
        .route("/continue", post(checkout::proceed))
        .route("/details", get(checkout::details))
        .route("/confirmation", get(checkout::confirmation))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // The storefront's two screens hang off the cart
        .route("/", get(|| async { Redirect::to("/cart") }))
        // Cart routes
        .nest("/cart", cart_routes())
        // Checkout routes
        .nest("/checkout", checkout_routes())
        // Auth routes
        .nest("/auth", auth_routes())
}
