//! Core types for Copperleaf.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod money;
pub mod quantity;

pub use id::*;
pub use money::Price;
pub use quantity::Quantity;
