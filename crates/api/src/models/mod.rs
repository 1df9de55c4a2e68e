//! Domain models for the catalog and cart.
//!
//! These are the shapes returned by the repositories in [`crate::db`]. The
//! GraphQL layer wraps them in output types that fix the wire field names.

pub mod cart;
pub mod category;
pub mod order;
pub mod product;

pub use cart::{CartLine, NewCartItem};
pub use category::Category;
pub use order::{Order, OrderLine, check_reported_total, subtotal};
pub use product::{Product, ProductAttributes};
