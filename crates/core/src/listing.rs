//! Search, category filter and price sort over a product listing.
//!
//! Filtering is a linear scan; sorting is stable, so products with equal
//! prices keep their catalog order.

use core::str::FromStr;

use crate::types::ProductRecord;

/// Sort order for a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListingSort {
    /// Catalog order.
    #[default]
    Unsorted,
    /// Cheapest first.
    PriceLow,
    /// Most expensive first.
    PriceHigh,
}

impl ListingSort {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unsorted => "",
            Self::PriceLow => "price-low",
            Self::PriceHigh => "price-high",
        }
    }
}

/// Unknown sort keyword.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown sort order: {0} (expected price-low or price-high)")]
pub struct ParseSortError(String);

impl FromStr for ListingSort {
    type Err = ParseSortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" => Ok(Self::Unsorted),
            "price-low" => Ok(Self::PriceLow),
            "price-high" => Ok(Self::PriceHigh),
            other => Err(ParseSortError(other.to_owned())),
        }
    }
}

/// Search and filter criteria for a listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingQuery {
    /// Case-insensitive substring matched against the product name.
    pub search: Option<String>,
    /// Case-insensitive substring matched against category or seller.
    pub category: Option<String>,
    pub sort: ListingSort,
}

impl ListingQuery {
    /// Whether `product` passes the search and category filters.
    #[must_use]
    pub fn matches(&self, product: &ProductRecord) -> bool {
        if let Some(search) = normalized(self.search.as_deref())
            && !product.name.to_lowercase().contains(&search)
        {
            return false;
        }

        if let Some(category) = normalized(self.category.as_deref()) {
            let in_category = product
                .category
                .as_deref()
                .is_some_and(|c| c.to_lowercase().contains(&category));
            let in_seller = product.seller_name().to_lowercase().contains(&category);
            if !in_category && !in_seller {
                return false;
            }
        }

        true
    }

    /// Filter and sort `products`.
    #[must_use]
    pub fn apply(&self, products: &[ProductRecord]) -> Vec<ProductRecord> {
        let mut visible: Vec<ProductRecord> = products
            .iter()
            .filter(|p| self.matches(p))
            .cloned()
            .collect();

        match self.sort {
            ListingSort::Unsorted => {}
            ListingSort::PriceLow => visible.sort_by(|a, b| a.price.cmp(&b.price)),
            ListingSort::PriceHigh => visible.sort_by(|a, b| b.price.cmp(&a.price)),
        }

        visible
    }
}

fn normalized(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_lowercase)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::sample_products;

    fn names(products: &[ProductRecord]) -> Vec<&str> {
        products.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_empty_query_keeps_listing() {
        let query = ListingQuery::default();
        assert_eq!(query.apply(&sample_products()), sample_products());
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let query = ListingQuery {
            search: Some("ORGANIC".to_string()),
            ..Default::default()
        };
        let result = query.apply(&sample_products());
        assert_eq!(names(&result), ["Organic Apples", "Organic Rice"]);
    }

    #[test]
    fn test_category_matches_category_or_seller() {
        let query = ListingQuery {
            category: Some("dairy".to_string()),
            ..Default::default()
        };
        assert_eq!(names(&query.apply(&sample_products())), ["Farm Fresh Milk"]);

        let query = ListingQuery {
            category: Some("orchards".to_string()),
            ..Default::default()
        };
        assert_eq!(names(&query.apply(&sample_products())), ["Organic Apples"]);
    }

    #[test]
    fn test_price_sorts() {
        let low = ListingQuery {
            sort: ListingSort::PriceLow,
            ..Default::default()
        };
        assert_eq!(
            names(&low.apply(&sample_products())),
            ["Farm Fresh Milk", "Fresh Tomatoes", "Organic Rice", "Organic Apples"]
        );

        let high = ListingQuery {
            sort: ListingSort::PriceHigh,
            ..Default::default()
        };
        assert_eq!(
            names(&high.apply(&sample_products())),
            ["Organic Apples", "Organic Rice", "Fresh Tomatoes", "Farm Fresh Milk"]
        );
    }

    #[test]
    fn test_parse_sort() {
        assert_eq!("price-low".parse::<ListingSort>().unwrap(), ListingSort::PriceLow);
        assert_eq!("".parse::<ListingSort>().unwrap(), ListingSort::Unsorted);
        assert!("cheapest".parse::<ListingSort>().is_err());
    }
}
