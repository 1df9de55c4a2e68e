//! Core types for Shopql.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod options;
pub mod price;

pub use id::*;
pub use options::{CartOptions, OptionKind, QuantityError, validate_quantity};
pub use price::{Currency, Price};
