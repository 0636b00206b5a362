//! Checkout.

use tracing::{info, instrument};

use super::{ORDER_FAILED, settle};
use crate::api::types::order_id;
use crate::api::{ApiClient, ApiResponse, OrderRequest};
use crate::cart::CartStore;
use crate::error::{AppError, Result};
use crate::session::SessionStore;
use crate::storage::KeyValueStorage;

/// Places orders for the current cart.
pub struct OrderService<'a, S> {
    api: &'a ApiClient,
    sessions: &'a SessionStore<S>,
}

impl<'a, S: KeyValueStorage> OrderService<'a, S> {
    #[must_use]
    pub const fn new(api: &'a ApiClient, sessions: &'a SessionStore<S>) -> Self {
        Self { api, sessions }
    }

    /// Submit the cart as an order. The cart is cleared once the backend
    /// accepts it.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotLoggedIn` without a session token and
    /// `AppError::EmptyCart` when there is nothing to order. Backend failures
    /// are reported in the returned response.
    #[instrument(skip(self, cart, shipping_address))]
    pub async fn place<C: KeyValueStorage>(
        &self,
        cart: &mut CartStore<C>,
        shipping_address: Option<String>,
    ) -> Result<ApiResponse> {
        let token = self.sessions.bearer_token().ok_or(AppError::NotLoggedIn)?;

        let snapshot = cart.snapshot();
        if snapshot.is_empty() {
            return Err(AppError::EmptyCart);
        }

        let order = OrderRequest::from_cart(&snapshot, shipping_address);
        let mut response = settle(self.api.create_order(&order, &token).await, ORDER_FAILED);

        if response.success {
            let id = order_id(&response);
            info!(order_id = ?id, total = %order.total_amount, "order placed");
            cart.clear();
            if response.message.is_none() {
                response.message = Some(match id {
                    Some(id) => format!("Order {id} placed successfully!"),
                    None => "Order placed successfully!".to_string(),
                });
            }
        }

        Ok(response)
    }
}
