//! Product records as served by the catalog backend.

use serde::{Deserialize, Serialize};

use super::{Price, ProductId};

/// Seller label used when a product carries no seller.
pub const DEFAULT_SELLER: &str = "Local Farmer";

/// Unit of measure used when a product carries no unit.
pub const DEFAULT_UNIT: &str = "kg";

/// The seller of a product.
///
/// The backend sends either a bare name or a populated seller document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Seller {
    Name(String),
    Profile { name: String },
}

impl Seller {
    /// The seller's display name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Name(name) | Self::Profile { name } => name,
        }
    }
}

/// A product as listed by the catalog.
///
/// Records may identify themselves through `id`, `_id`, or both.
/// [`ProductRecord::canonical_id`] unifies them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ProductId>,
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<ProductId>,
    pub name: String,
    pub price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller: Option<Seller>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ProductRecord {
    /// Build a minimal record with a single identifier.
    #[must_use]
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price: Price) -> Self {
        Self {
            id: Some(id.into()),
            object_id: None,
            name: name.into(),
            price,
            seller: None,
            image: None,
            unit: None,
            badge: None,
            category: None,
            description: None,
        }
    }

    /// The canonical identifier of this product.
    ///
    /// Prefers `id`, then `_id`. Records with neither (scraped cards from
    /// static pages) are identified by their name.
    #[must_use]
    pub fn canonical_id(&self) -> ProductId {
        self.id
            .as_ref()
            .or(self.object_id.as_ref())
            .cloned()
            .unwrap_or_else(|| ProductId::new(self.name.clone()))
    }

    /// Seller name, or [`DEFAULT_SELLER`].
    #[must_use]
    pub fn seller_name(&self) -> &str {
        self.seller
            .as_ref()
            .map(Seller::name)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_SELLER)
    }

    /// Unit of measure, or [`DEFAULT_UNIT`].
    #[must_use]
    pub fn unit_or_default(&self) -> &str {
        self.unit
            .as_deref()
            .filter(|unit| !unit.is_empty())
            .unwrap_or(DEFAULT_UNIT)
    }

    /// Whether `id` names this product.
    #[must_use]
    pub fn has_id(&self, id: &str) -> bool {
        self.canonical_id().matches(id)
            || self.object_id.as_ref().is_some_and(|other| other.matches(id))
    }

    #[must_use]
    pub fn with_seller(mut self, seller: impl Into<String>) -> Self {
        self.seller = Some(Seller::Name(seller.into()));
        self
    }

    #[must_use]
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn with_badge(mut self, badge: impl Into<String>) -> Self {
        self.badge = Some(badge.into());
        self
    }

    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }
}
