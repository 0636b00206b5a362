//! HTTP client for the marketplace backend.
//!
//! # Endpoints
//!
//! - `GET /products/featured`, `GET /products` - catalog listings
//! - `POST /auth/login`, `POST /auth/register` - accounts
//! - `POST /products` - list a product for sale (bearer token, multipart)
//! - `POST /orders` - place an order (bearer token)
//! - `POST /newsletter/subscribe` - newsletter signup
//!
//! Every endpoint answers with a JSON `{success, message?, ...}` body, also on
//! 4xx responses. Bodies are decoded whatever the status; only a body that
//! cannot be decoded turns a non-2xx status into [`ApiError::Status`].

pub mod types;

use std::sync::Arc;

use farmers_market_core::ProductRecord;
use reqwest::multipart::{Form, Part};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::catalog::CatalogSource;
use crate::config::StorefrontConfig;

pub use types::{
    ApiResponse, LoginRequest, LoginResponse, NewProduct, NewsletterRequest, OrderItem,
    OrderRequest, ProductsResponse, RegisterRequest,
};

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connection refused, timeout, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with an error status and an undecodable body.
    #[error("API error: {status} - {message}")]
    Status { status: u16, message: String },

    /// Response body was not the expected JSON.
    #[error("Parse error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Backend answered `success: false`.
    #[error("Rejected: {0}")]
    Rejected(String),
}

/// Client for the marketplace backend.
///
/// Cheaply cloneable; clones share one connection pool.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: String,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &StorefrontConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.api_base.as_str().trim_end_matches('/').to_string(),
            }),
        })
    }

    /// The base URL every endpoint path is appended to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    /// Fetch the featured products.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects it.
    #[instrument(skip(self))]
    pub async fn featured_products(&self) -> Result<Vec<ProductRecord>, ApiError> {
        self.fetch_products("/products/featured").await
    }

    /// Fetch every product.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects it.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Vec<ProductRecord>, ApiError> {
        self.fetch_products("/products").await
    }

    async fn fetch_products(&self, path: &str) -> Result<Vec<ProductRecord>, ApiError> {
        let response = self.inner.client.get(self.endpoint(path)).send().await?;
        let body: ProductsResponse = decode(response).await?;

        if !body.success {
            return Err(ApiError::Rejected(
                body.message.unwrap_or_else(|| "listing unavailable".to_string()),
            ));
        }

        debug!(count = body.products.len(), "products fetched");
        Ok(body.products)
    }

    /// Log in with email and password.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the body cannot be decoded.
    /// A `success: false` body is returned as `Ok`.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let response = self
            .inner
            .client
            .post(self.endpoint("/auth/login"))
            .json(&LoginRequest { email, password })
            .send()
            .await?;
        decode(response).await
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the body cannot be decoded.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<ApiResponse, ApiError> {
        let response = self
            .inner
            .client
            .post(self.endpoint("/auth/register"))
            .json(request)
            .send()
            .await?;
        decode(response).await
    }

    /// List a product for sale.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the body cannot be decoded.
    #[instrument(skip(self, product, token), fields(name = %product.name))]
    pub async fn create_product(
        &self,
        product: NewProduct,
        token: &SecretString,
    ) -> Result<ApiResponse, ApiError> {
        let mut form = Form::new()
            .text("name", product.name)
            .text("price", product.price.amount().to_string());
        if let Some(unit) = product.unit {
            form = form.text("unit", unit);
        }
        if let Some(category) = product.category {
            form = form.text("category", category);
        }
        if let Some(description) = product.description {
            form = form.text("description", description);
        }
        if let Some((bytes, file_name)) = product.image {
            form = form.part("image", Part::bytes(bytes).file_name(file_name));
        }

        let response = self
            .inner
            .client
            .post(self.endpoint("/products"))
            .bearer_auth(token.expose_secret())
            .multipart(form)
            .send()
            .await?;
        decode(response).await
    }

    /// Place an order.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the body cannot be decoded.
    #[instrument(skip(self, order, token), fields(items = order.items.len()))]
    pub async fn create_order(
        &self,
        order: &OrderRequest,
        token: &SecretString,
    ) -> Result<ApiResponse, ApiError> {
        let response = self
            .inner
            .client
            .post(self.endpoint("/orders"))
            .bearer_auth(token.expose_secret())
            .json(order)
            .send()
            .await?;
        decode(response).await
    }

    /// Subscribe an email address to the newsletter.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the body cannot be decoded.
    #[instrument(skip(self))]
    pub async fn subscribe_newsletter(&self, email: &str) -> Result<ApiResponse, ApiError> {
        let response = self
            .inner
            .client
            .post(self.endpoint("/newsletter/subscribe"))
            .json(&NewsletterRequest { email })
            .send()
            .await?;
        decode(response).await
    }
}

impl CatalogSource for ApiClient {
    async fn featured(&self) -> Result<Vec<ProductRecord>, ApiError> {
        self.featured_products().await
    }

    async fn all(&self) -> Result<Vec<ProductRecord>, ApiError> {
        self.products().await
    }
}

/// Decode a JSON body regardless of status.
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();
    // Get response body as text first for better error diagnostics
    let text = response.text().await?;

    match serde_json::from_str(&text) {
        Ok(body) => Ok(body),
        Err(_) if !status.is_success() => Err(ApiError::Status {
            status: status.as_u16(),
            message: text,
        }),
        Err(e) => Err(ApiError::Decode(e)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client_for(base: &str) -> ApiClient {
        let config = StorefrontConfig::from_lookup(|key| {
            (key == "FM_API_BASE").then(|| base.to_string())
        })
        .unwrap();
        ApiClient::new(&config).unwrap()
    }

    #[test]
    fn test_endpoint_join() {
        let client = client_for("http://localhost:3000/api/");
        assert_eq!(client.base_url(), "http://localhost:3000/api");
        assert_eq!(
            client.endpoint("/products/featured"),
            "http://localhost:3000/api/products/featured"
        );
    }

    #[test]
    fn test_api_error_display() {
        let err = ApiError::Status {
            status: 502,
            message: "bad gateway".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 502 - bad gateway");
        assert_eq!(
            ApiError::Rejected("closed".to_string()).to_string(),
            "Rejected: closed"
        );
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_http_error() {
        // Nothing listens on the local discard port.
        let client = client_for("http://127.0.0.1:9/api");
        let result = client.products().await;
        assert!(matches!(result, Err(ApiError::Http(_))));
    }
}
