//! Unified error handling for the storefront.
//!
//! Each concern has its own error enum (`ConfigError`, `StorageError`,
//! `ApiError`); `AppError` wraps them for the command layer. Cart operations
//! never produce errors, and backend failures reach the user as failed
//! [`ApiResponse`](crate::api::ApiResponse)s rather than as `AppError`s.

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::storage::StorageError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Local storage could not be read or written.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Backend client could not be built.
    #[error("Backend error: {0}")]
    Api(#[from] ApiError),

    /// Reading a local file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The operation needs a logged-in user.
    #[error("Please login to continue")]
    NotLoggedIn,

    /// Checkout with nothing in the cart.
    #[error("Your cart is empty")]
    EmptyCart,

    /// No product with this identifier in the current listing.
    #[error("Unknown product: {0}")]
    UnknownProduct(String),

    /// User input was rejected before reaching the backend.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
