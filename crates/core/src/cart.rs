//! Cart line items and the pure cart reducer.
//!
//! [`Cart`] is an ordered list of line items, unique by product identifier,
//! in insertion order. All identifier comparisons are string comparisons on
//! the canonical [`ProductId`], the same policy for `add`, `remove` and
//! `set_quantity`.
//!
//! The persisted form is a flat JSON array of line items. Older records that
//! carry `_id` (or both `id` and `_id`, or only a name) are accepted and
//! normalised on load; duplicate identifiers in a stored array are merged.

use serde::{Deserialize, Serialize};

use crate::quantity::Quantity;
use crate::types::product::{DEFAULT_SELLER, DEFAULT_UNIT};
use crate::types::{Price, ProductId, ProductRecord};

/// One product line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredLineItem")]
pub struct CartLineItem {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub seller: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub unit: String,
    pub quantity: Quantity,
}

impl CartLineItem {
    /// A new line for `product` with quantity 1.
    #[must_use]
    pub fn from_product(product: &ProductRecord) -> Self {
        Self {
            id: product.canonical_id(),
            name: product.name.clone(),
            price: product.price,
            seller: product.seller_name().to_owned(),
            image: product.image.clone(),
            unit: product.unit_or_default().to_owned(),
            quantity: Quantity::ONE,
        }
    }

    /// `price × quantity` for this line.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.line_total(self.quantity.get())
    }
}

/// Line item as found in storage, before normalisation.
#[derive(Deserialize)]
struct StoredLineItem {
    #[serde(default)]
    id: Option<ProductId>,
    #[serde(rename = "_id", default)]
    object_id: Option<ProductId>,
    name: String,
    price: Price,
    #[serde(default)]
    seller: Option<String>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    unit: Option<String>,
    #[serde(default)]
    quantity: Option<Quantity>,
}

impl From<StoredLineItem> for CartLineItem {
    fn from(stored: StoredLineItem) -> Self {
        let id = stored
            .id
            .or(stored.object_id)
            .unwrap_or_else(|| ProductId::new(stored.name.clone()));

        Self {
            id,
            name: stored.name,
            price: stored.price,
            seller: stored
                .seller
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_SELLER.to_owned()),
            image: stored.image,
            unit: stored
                .unit
                .filter(|u| !u.is_empty())
                .unwrap_or_else(|| DEFAULT_UNIT.to_owned()),
            quantity: stored.quantity.unwrap_or_default(),
        }
    }
}

/// Result of [`Cart::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new line was appended.
    Inserted,
    /// An existing line's quantity went up by one.
    Incremented(Quantity),
}

/// The shopping cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<CartLineItem>", into = "Vec<CartLineItem>")]
pub struct Cart {
    lines: Vec<CartLineItem>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Add one unit of `product`.
    ///
    /// Increments the existing line for the product's canonical identifier,
    /// or appends a new line with quantity 1.
    pub fn add(&mut self, product: &ProductRecord) -> AddOutcome {
        let id = product.canonical_id();
        if let Some(line) = self.line_mut(id.as_str()) {
            line.quantity = line.quantity.incremented();
            return AddOutcome::Incremented(line.quantity);
        }
        self.lines.push(CartLineItem::from_product(product));
        AddOutcome::Inserted
    }

    /// Remove every line matching `id`. Returns whether anything was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| !line.id.matches(id));
        self.lines.len() != before
    }

    /// Set the quantity of the line matching `id`.
    ///
    /// Returns `false` (and changes nothing) when no line matches.
    pub fn set_quantity(&mut self, id: &str, quantity: Quantity) -> bool {
        match self.line_mut(id) {
            Some(line) => {
                line.quantity = quantity;
                true
            }
            None => false,
        }
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of `price × quantity` over all lines.
    #[must_use]
    pub fn total(&self) -> Price {
        self.lines.iter().map(CartLineItem::line_total).sum()
    }

    /// Sum of quantities over all lines (the badge count, not the line count).
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0_u32, |acc, line| acc.saturating_add(line.quantity.get()))
    }

    /// The line for `id`, if any.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&CartLineItem> {
        self.lines.iter().find(|line| line.id.matches(id))
    }

    /// Lines in display order.
    #[must_use]
    pub fn lines(&self) -> &[CartLineItem] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    fn line_mut(&mut self, id: &str) -> Option<&mut CartLineItem> {
        self.lines.iter_mut().find(|line| line.id.matches(id))
    }
}

impl From<Vec<CartLineItem>> for Cart {
    fn from(items: Vec<CartLineItem>) -> Self {
        let mut lines: Vec<CartLineItem> = Vec::with_capacity(items.len());
        for item in items {
            match lines.iter_mut().find(|line| line.id == item.id) {
                Some(existing) => {
                    let merged = existing.quantity.get().saturating_add(item.quantity.get());
                    existing.quantity = Quantity::clamped(i64::from(merged));
                }
                None => lines.push(item),
            }
        }
        Self { lines }
    }
}

impl From<Cart> for Vec<CartLineItem> {
    fn from(cart: Cart) -> Self {
        cart.lines
    }
}
