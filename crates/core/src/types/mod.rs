//! Core types for Farmers Market.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod price;
pub mod product;

pub use id::{OrderId, ProductId, UserId};
pub use price::{Price, PriceError};
pub use product::{ProductRecord, Seller};
