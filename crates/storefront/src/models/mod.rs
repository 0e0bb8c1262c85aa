//! Domain and session models for the storefront.

pub mod session;

pub use session::{CheckoutHandoff, CurrentUser, session_keys};
