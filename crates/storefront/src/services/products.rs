//! Listing products for sale.

use tracing::{info, instrument};

use super::{CREATE_PRODUCT_FAILED, settle};
use crate::api::{ApiClient, ApiResponse, NewProduct};
use crate::error::{AppError, Result};
use crate::session::SessionStore;
use crate::storage::KeyValueStorage;

/// Creates products on behalf of the logged-in seller.
pub struct ProductService<'a, S> {
    api: &'a ApiClient,
    sessions: &'a SessionStore<S>,
}

impl<'a, S: KeyValueStorage> ProductService<'a, S> {
    #[must_use]
    pub const fn new(api: &'a ApiClient, sessions: &'a SessionStore<S>) -> Self {
        Self { api, sessions }
    }

    /// List `product` for sale.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotLoggedIn` without a session token and
    /// `AppError::InvalidInput` for a blank name.
    #[instrument(skip(self, product), fields(name = %product.name))]
    pub async fn create(&self, product: NewProduct) -> Result<ApiResponse> {
        let token = self.sessions.bearer_token().ok_or(AppError::NotLoggedIn)?;

        if product.name.trim().is_empty() {
            return Err(AppError::InvalidInput("product name is required".to_string()));
        }

        let name = product.name.clone();
        let price = product.price;
        let mut response = settle(
            self.api.create_product(product, &token).await,
            CREATE_PRODUCT_FAILED,
        );

        if response.success {
            info!(%price, "product listed");
            if response.message.is_none() {
                response.message = Some(format!("{name} listed for {price} successfully!"));
            }
        }

        Ok(response)
    }
}
