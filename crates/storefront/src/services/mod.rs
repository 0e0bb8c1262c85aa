//! Business logic services over the collaborator clients.

pub mod cart;

pub use cart::CartService;
