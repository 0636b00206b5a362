//! Product catalog with built-in fallback.
//!
//! Listings come from a [`CatalogSource`] (the backend). If the source fails,
//! rejects the request or returns no products, the built-in sample catalog is
//! shown instead so a listing is never empty. Fallback is never reported as an
//! error; it is logged and visible only through [`ListingOrigin`].

use std::future::Future;

use farmers_market_core::ProductRecord;
use farmers_market_core::catalog::{sample_featured, sample_products};
use tracing::{info, warn};

use crate::api::ApiError;

/// Where product listings come from.
pub trait CatalogSource {
    /// The featured products.
    fn featured(&self) -> impl Future<Output = Result<Vec<ProductRecord>, ApiError>> + Send;

    /// Every product.
    fn all(&self) -> impl Future<Output = Result<Vec<ProductRecord>, ApiError>> + Send;
}

/// Whether a listing came from the source or the sample catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingOrigin {
    Remote,
    Fallback,
}

/// A product listing ready to render.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogListing {
    pub products: Vec<ProductRecord>,
    pub origin: ListingOrigin,
}

impl CatalogListing {
    /// Find a product by any of its identifiers.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&ProductRecord> {
        self.products.iter().find(|p| p.has_id(id))
    }
}

/// Catalog over a [`CatalogSource`].
#[derive(Debug, Clone)]
pub struct Catalog<C> {
    source: C,
}

impl<C: CatalogSource> Catalog<C> {
    pub const fn new(source: C) -> Self {
        Self { source }
    }

    /// The featured listing, or the first sample products.
    pub async fn load_featured(&self) -> CatalogListing {
        resolve("featured", self.source.featured().await, sample_featured)
    }

    /// The full listing, or the whole sample catalog.
    pub async fn load_all(&self) -> CatalogListing {
        resolve("all", self.source.all().await, sample_products)
    }
}

fn resolve(
    listing: &str,
    result: Result<Vec<ProductRecord>, ApiError>,
    fallback: fn() -> Vec<ProductRecord>,
) -> CatalogListing {
    match result {
        Ok(products) if !products.is_empty() => {
            info!(listing, count = products.len(), "catalog loaded");
            CatalogListing {
                products,
                origin: ListingOrigin::Remote,
            }
        }
        Ok(_) => {
            info!(listing, "catalog empty, showing sample products");
            CatalogListing {
                products: fallback(),
                origin: ListingOrigin::Fallback,
            }
        }
        Err(e) => {
            warn!(listing, error = %e, "catalog unavailable, showing sample products");
            CatalogListing {
                products: fallback(),
                origin: ListingOrigin::Fallback,
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use farmers_market_core::Price;

    use super::*;

    /// Source returning canned results.
    struct StubSource {
        featured: fn() -> Result<Vec<ProductRecord>, ApiError>,
        all: fn() -> Result<Vec<ProductRecord>, ApiError>,
    }

    impl CatalogSource for StubSource {
        async fn featured(&self) -> Result<Vec<ProductRecord>, ApiError> {
            (self.featured)()
        }

        async fn all(&self) -> Result<Vec<ProductRecord>, ApiError> {
            (self.all)()
        }
    }

    fn failing() -> Result<Vec<ProductRecord>, ApiError> {
        Err(ApiError::Rejected("database offline".to_string()))
    }

    fn empty() -> Result<Vec<ProductRecord>, ApiError> {
        Ok(Vec::new())
    }

    fn one_product() -> Result<Vec<ProductRecord>, ApiError> {
        Ok(vec![ProductRecord::new("p-1", "Mangoes", Price::from_units(120))])
    }

    fn ids(listing: &CatalogListing) -> Vec<String> {
        listing
            .products
            .iter()
            .map(|p| p.canonical_id().into_inner())
            .collect()
    }

    #[tokio::test]
    async fn test_failure_falls_back_to_samples() {
        let catalog = Catalog::new(StubSource {
            featured: failing,
            all: failing,
        });

        let all = catalog.load_all().await;
        assert_eq!(all.origin, ListingOrigin::Fallback);
        assert_eq!(ids(&all), ["demo-1", "demo-2", "demo-3", "demo-4"]);

        let featured = catalog.load_featured().await;
        assert_eq!(featured.origin, ListingOrigin::Fallback);
        assert_eq!(featured.products.len(), 4);
    }

    #[tokio::test]
    async fn test_empty_result_falls_back() {
        let catalog = Catalog::new(StubSource {
            featured: empty,
            all: empty,
        });
        assert_eq!(catalog.load_all().await.origin, ListingOrigin::Fallback);
    }

    #[tokio::test]
    async fn test_remote_products_used() {
        let catalog = Catalog::new(StubSource {
            featured: one_product,
            all: one_product,
        });
        let listing = catalog.load_featured().await;
        assert_eq!(listing.origin, ListingOrigin::Remote);
        assert_eq!(ids(&listing), ["p-1"]);
        assert!(listing.find("p-1").is_some());
        assert!(listing.find("demo-1").is_none());
    }
}
