//! Catalog listings against a live, failing and unreachable backend.

use axum::http::StatusCode;
use farmers_market_integration_tests::{StubBackend, config_for, spawn_failing, unreachable_base};
use farmers_market_storefront::api::{ApiClient, ApiError};
use farmers_market_storefront::{Catalog, ListingOrigin};
use serde_json::json;

fn catalog_for(api_base: &str) -> Catalog<ApiClient> {
    let config = config_for(api_base).expect("valid config");
    Catalog::new(ApiClient::new(&config).expect("client builds"))
}

fn ids(products: &[farmers_market_core::ProductRecord]) -> Vec<String> {
    products
        .iter()
        .map(|p| p.canonical_id().into_inner())
        .collect()
}

#[tokio::test]
async fn test_remote_listing_with_mixed_identifiers() {
    let backend = StubBackend::spawn(json!([
        { "_id": "64f0a1", "name": "Mangoes", "price": 120, "seller": { "name": "Konkan Farms" } },
        { "id": 7, "name": "Jaggery", "price": 95.5, "unit": "block" },
        { "name": "Curry Leaves", "price": 10 },
    ]))
    .await
    .expect("stub backend starts");

    let listing = catalog_for(&backend.api_base()).load_all().await;

    assert_eq!(listing.origin, ListingOrigin::Remote);
    assert_eq!(ids(&listing.products), ["64f0a1", "7", "Curry Leaves"]);
    assert_eq!(listing.products[0].seller_name(), "Konkan Farms");
    assert_eq!(listing.products[1].unit_or_default(), "block");
    assert_eq!(listing.products[2].seller_name(), "Local Farmer");
}

#[tokio::test]
async fn test_featured_listing_is_limited() {
    let products: Vec<_> = (1..=6)
        .map(|i| json!({ "id": format!("p-{i}"), "name": format!("Product {i}"), "price": i * 10 }))
        .collect();
    let backend = StubBackend::spawn(json!(products))
        .await
        .expect("stub backend starts");

    let listing = catalog_for(&backend.api_base()).load_featured().await;
    assert_eq!(listing.origin, ListingOrigin::Remote);
    assert_eq!(listing.products.len(), 4);
}

#[tokio::test]
async fn test_empty_backend_shows_samples() {
    let backend = StubBackend::spawn(json!([]))
        .await
        .expect("stub backend starts");

    let listing = catalog_for(&backend.api_base()).load_all().await;
    assert_eq!(listing.origin, ListingOrigin::Fallback);
    assert_eq!(ids(&listing.products), ["demo-1", "demo-2", "demo-3", "demo-4"]);
}

#[tokio::test]
async fn test_unreachable_backend_shows_samples() {
    let base = unreachable_base().await.expect("free port");
    let catalog = catalog_for(&base);

    let all = catalog.load_all().await;
    assert_eq!(all.origin, ListingOrigin::Fallback);
    assert_eq!(all.products[0].name, "Fresh Tomatoes");

    let featured = catalog.load_featured().await;
    assert_eq!(featured.origin, ListingOrigin::Fallback);
    assert_eq!(ids(&featured.products), ["demo-1", "demo-2", "demo-3", "demo-4"]);
}

#[tokio::test]
async fn test_server_error_is_status_error_and_falls_back() {
    let base = spawn_failing(StatusCode::INTERNAL_SERVER_ERROR)
        .await
        .expect("failing backend starts");
    let config = config_for(&base).expect("valid config");
    let client = ApiClient::new(&config).expect("client builds");

    let err = client.products().await.expect_err("backend fails");
    assert!(matches!(err, ApiError::Status { status: 500, .. }));

    let listing = Catalog::new(client).load_all().await;
    assert_eq!(listing.origin, ListingOrigin::Fallback);
}
