//! Integration tests for Copperleaf.
//!
//! # Running Tests
//!
//! The tests in `tests/` drive a running storefront over HTTP and are
//! `#[ignore]`d by default. They need:
//!
//! - A running storefront (`cargo run -p copperleaf-storefront`)
//! - A reachable document store and identity service (or local stand-ins)
//! - `STOREFRONT_BASE_URL` (default: `http://localhost:3000`)
//! - `TEST_USER_EMAIL` / `TEST_USER_PASSWORD` - credentials known to the
//!   identity service, for the flows that require login
//!
//! ```bash
//! cargo test -p copperleaf-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `storefront_cart` - Cart screen and HTMX fragment endpoints
//! - `storefront_checkout` - Checkout summary, buy-now, and handoff flows
