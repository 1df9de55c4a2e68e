//! Shopql API library.
//!
//! A GraphQL backend for a small storefront: catalog browsing, a single
//! shared cart, and checkout into orders. The binary in `main.rs` wires these
//! modules to `PostgreSQL`; tests wire them to an in-memory store.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod graphql;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
