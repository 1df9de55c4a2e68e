//! Shopql Core - Shared catalog and cart types.
//!
//! This crate provides the types used across all Shopql components:
//! - `api` - GraphQL server over the catalog/cart database
//! - `cli` - Command-line tools for migrations and catalog seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP. Rules that both the database repositories and the test
//! store must agree on (attribute value ordering, quick-add defaults) live here.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, and cart option selectors
//! - [`attributes`] - Attribute value ordering and grouping

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod attributes;
pub mod types;

pub use attributes::{
    Attribute, AttributeRow, collect_attributes, compare_values, group_attributes,
    sort_attribute_values,
};
pub use types::*;
