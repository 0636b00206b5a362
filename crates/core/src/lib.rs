//! Farmers Market Core - Shared types library.
//!
//! This crate provides the types used by every Farmers Market component:
//! - `storefront` - Cart store, session, backend client and the `fm` binary
//! - `integration-tests` - End-to-end tests against a stub backend
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no storage
//! access, no HTTP clients. The cart reducers here can be exercised with zero
//! rendering or persistence code.
//!
//! # Modules
//!
//! - [`types`] - Product identifiers, prices and product records
//! - [`cart`] - Cart line items and the cart reducer operations
//! - [`quantity`] - Clamped line item quantities
//! - [`catalog`] - The built-in sample catalog
//! - [`listing`] - Search, category filter and price sort over a listing

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod listing;
pub mod quantity;
pub mod types;

pub use cart::{Cart, CartLineItem};
pub use quantity::Quantity;
pub use types::*;
