//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `account` - Login, registration and the stored session
//! - `orders` - Checkout of the current cart
//! - `products` - Listing products for sale
//! - `newsletter` - Newsletter signup
//!
//! Services talk to the backend through [`ApiClient`](crate::api::ApiClient)
//! and report backend outcomes as [`ApiResponse`]s. A transport failure
//! becomes a failed response with a fixed user-facing message; the
//! underlying error is only logged.

pub mod account;
pub mod newsletter;
pub mod orders;
pub mod products;

pub use account::AccountService;
pub use newsletter::subscribe;
pub use orders::OrderService;
pub use products::ProductService;

use tracing::warn;

use crate::api::{ApiError, ApiResponse};

/// Shown when login cannot reach the backend.
pub const LOGIN_FAILED: &str = "Login failed. Please check if backend is running.";

/// Shown when registration cannot reach the backend.
pub const REGISTER_FAILED: &str = "Registration failed. Please check if backend is running.";

/// Shown when listing a product fails.
pub const CREATE_PRODUCT_FAILED: &str = "Failed to create product";

/// Shown when placing an order fails.
pub const ORDER_FAILED: &str = "Order creation failed";

/// Shown when newsletter signup fails.
pub const SUBSCRIBE_FAILED: &str = "Subscription failed";

/// Turn a backend result into a response, replacing errors with `message`.
fn settle(result: Result<ApiResponse, ApiError>, message: &str) -> ApiResponse {
    result.unwrap_or_else(|e| {
        warn!(error = %e, "backend call failed");
        ApiResponse::failure(message)
    })
}
