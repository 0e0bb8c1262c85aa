//! Copperleaf Core - Shared domain types.
//!
//! This crate provides the cart domain shared by the storefront binary and
//! its tests:
//!
//! - `storefront` - Public-facing cart and checkout screens
//! - `integration-tests` - End-to-end tests against a running storefront
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no session handling. Everything that touches the document store
//! lives in the storefront crate; everything here can be exercised without a
//! backend.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, money, and quantities
//! - [`cart`] - Cart line items, normalization, and sequence operations

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod types;

pub use cart::{Cart, CartItem, RawCartItem};
pub use types::*;
