//! Built-in sample catalog.
//!
//! Shown whenever the catalog backend is unreachable or returns nothing, so a
//! listing is never empty. The order is fixed.

use crate::types::{Price, ProductId, ProductRecord};

/// Number of products shown in the featured listing.
pub const FEATURED_LIMIT: usize = 4;

/// The full sample catalog, in display order.
#[must_use]
pub fn sample_products() -> Vec<ProductRecord> {
    vec![
        sample(
            "demo-1",
            "Fresh Tomatoes",
            60,
            "Farmer Ramesh",
            "vegetables",
            "https://images.pexels.com/photos/1327838/pexels-photo-1327838.jpeg?auto=compress&cs=tinysrgb&w=400",
            "Fresh",
            "kg",
        ),
        sample(
            "demo-2",
            "Organic Apples",
            150,
            "Sunrise Orchards",
            "fruits",
            "https://images.pexels.com/photos/102104/pexels-photo-102104.jpeg?auto=compress&cs=tinysrgb&w=400",
            "Organic",
            "kg",
        ),
        sample(
            "demo-3",
            "Farm Fresh Milk",
            50,
            "Green Dairy Farm",
            "dairy",
            "https://images.pexels.com/photos/248412/pexels-photo-248412.jpeg?auto=compress&cs=tinysrgb&w=400",
            "Fresh",
            "L",
        ),
        sample(
            "demo-4",
            "Organic Rice",
            80,
            "Golden Harvest",
            "grains",
            "https://images.unsplash.com/photo-1594038148386-077551062c3e?q=80&w=400",
            "Organic",
            "kg",
        ),
    ]
}

/// The featured subset of the sample catalog.
#[must_use]
pub fn sample_featured() -> Vec<ProductRecord> {
    let mut products = sample_products();
    products.truncate(FEATURED_LIMIT);
    products
}

#[allow(clippy::too_many_arguments)]
fn sample(
    id: &str,
    name: &str,
    price: u64,
    seller: &str,
    category: &str,
    image: &str,
    badge: &str,
    unit: &str,
) -> ProductRecord {
    let mut record = ProductRecord::new(id, name, Price::from_units(price))
        .with_seller(seller)
        .with_category(category)
        .with_image(image)
        .with_badge(badge)
        .with_unit(unit);
    record.object_id = Some(ProductId::new(id));
    record
}
