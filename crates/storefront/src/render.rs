//! Terminal rendering of products, the cart and notifications.
//!
//! Pure functions from domain values to text. Nothing here holds state; views
//! are re-rendered from a fresh snapshot whenever the cart changes.

use std::fmt::{self, Write as _};

use farmers_market_core::{Cart, Price, ProductRecord};
use url::Url;

/// Image shown for products without one.
pub const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/400x300?text=No+Image";

/// Line printed while a listing is being fetched.
pub const LOADING_MESSAGE: &str = "Loading products...";

/// Default currency symbol (Indian rupee).
pub const DEFAULT_CURRENCY_SYMBOL: &str = "₹";

// =============================================================================
// Prices
// =============================================================================

/// Formats prices with a currency symbol and two decimals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceFormatter {
    symbol: String,
}

impl PriceFormatter {
    #[must_use]
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
        }
    }

    /// `₹60.00`
    #[must_use]
    pub fn format(&self, price: Price) -> String {
        format!("{}{price}", self.symbol)
    }
}

impl Default for PriceFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_CURRENCY_SYMBOL)
    }
}

// =============================================================================
// Images
// =============================================================================

/// Resolve a product image to an absolute URL.
///
/// Absolute `http(s)` URLs are returned unchanged, relative paths are
/// appended to `asset_base`, and a missing or blank image resolves to
/// [`PLACEHOLDER_IMAGE`].
#[must_use]
pub fn resolve_image_url(image: Option<&str>, asset_base: &Url) -> String {
    let Some(image) = image.map(str::trim).filter(|s| !s.is_empty()) else {
        return PLACEHOLDER_IMAGE.to_string();
    };

    if image.starts_with("http") {
        return image.to_string();
    }

    format!(
        "{}/{}",
        asset_base.as_str().trim_end_matches('/'),
        image.trim_start_matches('/')
    )
}

// =============================================================================
// Views
// =============================================================================

/// Cart badge: the item count in brackets.
#[must_use]
pub fn badge(count: u32) -> String {
    format!("[cart: {count}]")
}

/// A product card for listings.
#[must_use]
pub fn product_card(product: &ProductRecord, prices: &PriceFormatter, asset_base: &Url) -> String {
    let mut card = String::new();

    let _ = write!(card, "{}", product.name);
    if let Some(badge) = &product.badge {
        let _ = write!(card, "  <{badge}>");
    }
    let _ = writeln!(card);
    let _ = writeln!(card, "  By {}", product.seller_name());
    let _ = writeln!(
        card,
        "  {}/{}",
        prices.format(product.price),
        product.unit_or_default()
    );
    if let Some(description) = &product.description {
        let _ = writeln!(card, "  {description}");
    }
    let _ = writeln!(
        card,
        "  {}",
        resolve_image_url(product.image.as_deref(), asset_base)
    );
    let _ = write!(card, "  id: {}", product.canonical_id());

    card
}

/// A listing of product cards separated by blank lines.
#[must_use]
pub fn product_list(products: &[ProductRecord], prices: &PriceFormatter, asset_base: &Url) -> String {
    if products.is_empty() {
        return "No products found.".to_string();
    }

    products
        .iter()
        .map(|p| product_card(p, prices, asset_base))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// The cart as a table with a total footer.
#[must_use]
pub fn cart_table(cart: &Cart, prices: &PriceFormatter) -> String {
    if cart.is_empty() {
        return format!("Your cart is empty.\nTotal: {}", prices.format(Price::ZERO));
    }

    let rows: Vec<[String; 6]> = cart
        .lines()
        .iter()
        .map(|line| {
            [
                line.id.to_string(),
                line.name.clone(),
                line.seller.clone(),
                format!("{}/{}", prices.format(line.price), line.unit),
                line.quantity.to_string(),
                prices.format(line.line_total()),
            ]
        })
        .collect();

    let header = ["ID", "Product", "Seller", "Price", "Qty", "Subtotal"].map(String::from);
    let mut widths = header.each_ref().map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut table = String::new();
    push_row(&mut table, &header, &widths);
    for row in &rows {
        push_row(&mut table, row, &widths);
    }
    let _ = write!(table, "Total: {}", prices.format(cart.total()));

    table
}

fn push_row(out: &mut String, cells: &[String; 6], widths: &[usize; 6]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!("{cell}{}", " ".repeat(pad))
        })
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(line.trim_end());
    out.push('\n');
}

// =============================================================================
// Notifications
// =============================================================================

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

/// A transient one-line notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.level {
            NoticeLevel::Success => "ok",
            NoticeLevel::Info => "info",
            NoticeLevel::Error => "error",
        };
        write!(f, "[{tag}] {}", self.message)
    }
}
