//! Farmers Market storefront library.
//!
//! The cart store, user session, backend client and terminal views behind
//! the `fm` binary, exposed as a library so they can be tested and reused.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod render;
pub mod services;
pub mod session;
pub mod storage;

pub use cart::{CartEvent, CartStore};
pub use catalog::{Catalog, CatalogListing, CatalogSource, ListingOrigin};
pub use config::StorefrontConfig;
pub use error::{AppError, Result};
pub use session::{SessionStore, UserSession};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
