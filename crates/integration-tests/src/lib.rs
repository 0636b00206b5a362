//! Integration tests for Farmers Market.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p farmers-market-integration-tests
//! ```
//!
//! Tests run the storefront against [`StubBackend`], an in-process `axum`
//! server on an ephemeral port that speaks the marketplace backend's JSON
//! protocol. No external services are needed.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};

use axum::extract::{Multipart, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::{get, post};
use axum::{Json, Router};
use farmers_market_storefront::StorefrontConfig;
use farmers_market_storefront::config::ConfigError;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;

/// Password the stub accepts for every account.
pub const PASSWORD: &str = "secret";

/// Token handed out on login.
pub const TOKEN: &str = "tok-123";

/// Email the stub treats as already registered.
pub const TAKEN_EMAIL: &str = "taken@example.com";

/// Identifier of every order the stub creates.
pub const ORDER_ID: &str = "o-1";

/// Requests the stub has accepted.
#[derive(Debug, Default)]
pub struct Recorded {
    pub orders: Vec<Value>,
    pub products: Vec<Vec<(String, String)>>,
    pub subscriptions: Vec<String>,
}

#[derive(Clone)]
struct StubState {
    products: Arc<Value>,
    recorded: Arc<Mutex<Recorded>>,
}

impl StubState {
    fn record<F: FnOnce(&mut Recorded)>(&self, f: F) {
        f(&mut self.recorded.lock().unwrap_or_else(PoisonError::into_inner));
    }
}

/// An in-process marketplace backend.
pub struct StubBackend {
    addr: SocketAddr,
    recorded: Arc<Mutex<Recorded>>,
}

impl StubBackend {
    /// Serve `products` (a JSON array) from a fresh backend.
    ///
    /// # Errors
    ///
    /// Returns error if no local port can be bound.
    pub async fn spawn(products: Value) -> std::io::Result<Self> {
        let recorded = Arc::new(Mutex::new(Recorded::default()));
        let state = StubState {
            products: Arc::new(products),
            recorded: Arc::clone(&recorded),
        };

        let api = Router::new()
            .route("/products", get(all_products).post(create_product))
            .route("/products/featured", get(featured_products))
            .route("/auth/login", post(login))
            .route("/auth/register", post(register))
            .route("/orders", post(create_order))
            .route("/newsletter/subscribe", post(subscribe))
            .with_state(state);

        let addr = serve(Router::new().nest("/api", api)).await?;
        Ok(Self { addr, recorded })
    }

    /// The backend's API base URL.
    #[must_use]
    pub fn api_base(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// Storefront configuration pointing at this backend.
    ///
    /// # Errors
    ///
    /// Returns error if the generated configuration is rejected.
    pub fn config(&self) -> Result<StorefrontConfig, ConfigError> {
        config_for(&self.api_base())
    }

    /// Run `f` over the requests recorded so far.
    pub fn recorded<T>(&self, f: impl FnOnce(&Recorded) -> T) -> T {
        f(&self.recorded.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

/// Storefront configuration for the given API base URL.
///
/// # Errors
///
/// Returns error if `api_base` is not a valid base URL.
pub fn config_for(api_base: &str) -> Result<StorefrontConfig, ConfigError> {
    StorefrontConfig::from_lookup(|key| match key {
        "FM_API_BASE" => Some(api_base.to_string()),
        "FM_REQUEST_TIMEOUT_SECS" => Some("5".to_string()),
        _ => None,
    })
}

/// A backend whose every endpoint fails with `status` and a plain-text body.
///
/// # Errors
///
/// Returns error if no local port can be bound.
pub async fn spawn_failing(status: StatusCode) -> std::io::Result<String> {
    let app = Router::new().fallback(move || async move { (status, "backend exploded") });
    let addr = serve(app).await?;
    Ok(format!("http://{addr}/api"))
}

/// An API base URL with nothing listening behind it.
///
/// # Errors
///
/// Returns error if no local port can be bound.
pub async fn unreachable_base() -> std::io::Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(format!("http://{addr}/api"))
}

async fn serve(app: Router) -> std::io::Result<SocketAddr> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(addr)
}

// =============================================================================
// Handlers
// =============================================================================

async fn all_products(State(state): State<StubState>) -> Json<Value> {
    Json(json!({ "success": true, "products": (*state.products).clone() }))
}

async fn featured_products(State(state): State<StubState>) -> Json<Value> {
    let featured: Vec<Value> = state
        .products
        .as_array()
        .map(|products| products.iter().take(4).cloned().collect())
        .unwrap_or_default();
    Json(json!({ "success": true, "products": featured }))
}

#[derive(Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

async fn login(Json(body): Json<LoginBody>) -> (StatusCode, Json<Value>) {
    if body.password != PASSWORD {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "success": false, "message": "Invalid credentials" })),
        );
    }

    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "user": { "_id": "u-1", "name": "Asha", "email": body.email, "role": "buyer" },
            "token": TOKEN,
        })),
    )
}

async fn register(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["email"] == TAKEN_EMAIL {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "message": "Email already registered" })),
        );
    }
    (
        StatusCode::CREATED,
        Json(json!({ "success": true, "message": "User registered successfully" })),
    )
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {TOKEN}"))
}

fn unauthorized() -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "success": false, "message": "Not authorized" })),
    )
}

async fn create_order(
    State(state): State<StubState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return unauthorized();
    }
    state.record(|r| r.orders.push(body));
    (
        StatusCode::CREATED,
        Json(json!({ "success": true, "order": { "_id": ORDER_ID } })),
    )
}

async fn create_product(
    State(state): State<StubState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return unauthorized();
    }

    let mut fields = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let value = field.text().await.unwrap_or_default();
        fields.push((name, value));
    }
    state.record(|r| r.products.push(fields));

    (
        StatusCode::CREATED,
        Json(json!({ "success": true, "message": "Product created" })),
    )
}

async fn subscribe(State(state): State<StubState>, Json(body): Json<Value>) -> Json<Value> {
    let email = body["email"].as_str().unwrap_or_default().to_string();
    state.record(|r| r.subscriptions.push(email));
    Json(json!({ "success": true }))
}
