//! Request and response bodies for the marketplace backend.

use farmers_market_core::{Cart, OrderId, Price, ProductRecord};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::session::UserSession;

/// Generic `{success, message?, ...}` envelope.
///
/// Every backend write answers with this shape; the UI shows `message` as a
/// transient notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

impl ApiResponse {
    /// A successful response carrying only a message.
    #[must_use]
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Map::new(),
        }
    }

    /// A failed response carrying only a message.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: Map::new(),
        }
    }

    /// The message, or `fallback` when the backend sent none.
    #[must_use]
    pub fn message_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.message.as_deref().unwrap_or(fallback)
    }
}

/// Body of `GET /products` and `GET /products/featured`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductsResponse {
    pub success: bool,
    #[serde(default)]
    pub products: Vec<ProductRecord>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub user: Option<UserSession>,
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Body of `POST /auth/register`.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewsletterRequest<'a> {
    pub email: &'a str,
}

/// A product listed for sale (`POST /products`, multipart form).
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub price: Price,
    pub unit: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    /// Image bytes and file name.
    pub image: Option<(Vec<u8>, String)>,
}

/// One line of an order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderItem {
    pub product: String,
    pub name: String,
    pub quantity: u32,
    pub price: Price,
}

/// Body of `POST /orders`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub items: Vec<OrderItem>,
    pub total_amount: Price,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<String>,
}

impl OrderRequest {
    /// Build an order for every line of `cart`.
    #[must_use]
    pub fn from_cart(cart: &Cart, shipping_address: Option<String>) -> Self {
        Self {
            items: cart
                .lines()
                .iter()
                .map(|line| OrderItem {
                    product: line.id.to_string(),
                    name: line.name.clone(),
                    quantity: line.quantity.get(),
                    price: line.price,
                })
                .collect(),
            total_amount: cart.total(),
            shipping_address,
        }
    }
}

/// Identifier of a created order, if the backend returned one.
#[must_use]
pub fn order_id(response: &ApiResponse) -> Option<OrderId> {
    let order = response.data.get("order")?;
    let id = order.get("_id").or_else(|| order.get("id"))?;
    serde_json::from_value(id.clone()).ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_response_keeps_extra_fields() {
        let response: ApiResponse =
            serde_json::from_str(r#"{"success": true, "message": "Order placed", "order": {"_id": "o-9"}}"#)
                .unwrap();
        assert!(response.success);
        assert_eq!(response.message_or("x"), "Order placed");
        assert_eq!(order_id(&response).unwrap().as_str(), "o-9");
    }

    #[test]
    fn test_message_fallback() {
        let response: ApiResponse = serde_json::from_str(r#"{"success": false}"#).unwrap();
        assert_eq!(response.message_or("Subscription failed"), "Subscription failed");
    }

    #[test]
    fn test_order_from_cart() {
        let mut cart = Cart::new();
        let tomatoes = ProductRecord::new("demo-1", "Fresh Tomatoes", Price::from_units(60));
        cart.add(&tomatoes);
        cart.add(&tomatoes);

        let order = OrderRequest::from_cart(&cart, Some("12 Market Road".to_string()));
        let json = serde_json::to_value(&order).unwrap();

        assert_eq!(json["items"][0]["product"], "demo-1");
        assert_eq!(json["items"][0]["quantity"], 2);
        assert_eq!(json["totalAmount"], 120.0);
        assert_eq!(json["shippingAddress"], "12 Market Road");
    }

    #[test]
    fn test_products_response_defaults() {
        let response: ProductsResponse = serde_json::from_str(r#"{"success": false}"#).unwrap();
        assert!(response.products.is_empty());
    }
}
