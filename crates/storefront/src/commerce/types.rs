//! Wire types for the commerce REST API.
//!
//! Field names follow the API's camelCase JSON. All of these are read-only
//! mirrors of server state except [`CartLineInput`], which is the one shape
//! the storefront writes back.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use larkspur_core::{Price, ProductId, UserId};

/// A catalog product.
///
/// Read-only mirror of server state; re-fetched wholesale on each catalog
/// load or filter application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    /// Non-negative decimal in the shop currency.
    pub price: Decimal,
    /// Non-negative units on hand.
    pub stock: u32,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl Product {
    /// The unit price as a displayable [`Price`].
    #[must_use]
    pub const fn unit_price(&self) -> Price {
        Price::usd(self.price)
    }

    /// Whether the product can currently be added to a cart.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// One line of a server cart: a product reference and a quantity >= 1.
///
/// Line ordering is server-assigned; the storefront never reorders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub item: Product,
    pub quantity: u32,
}

impl CartLine {
    /// The price of this line (unit price x quantity).
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.item.unit_price().times(self.quantity)
    }
}

/// Request body for cart add/update calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineInput {
    pub item_id: ProductId,
    pub quantity: u32,
}

impl CartLineInput {
    /// Create a cart line input.
    #[must_use]
    pub const fn new(item_id: ProductId, quantity: u32) -> Self {
        Self { item_id, quantity }
    }
}

/// Successful response from `POST /auth/login` and `POST /auth/signup`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub user_id: UserId,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    /// Bearer token for authenticated endpoints.
    pub token: String,
}

/// Catalog filter parameters, forwarded verbatim as API query parameters.
///
/// Every filter change triggers a full re-fetch with these parameters; there
/// is no client-side incremental filtering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogFilter {
    /// Exact category match.
    pub category: Option<String>,
    /// Name substring.
    pub name: Option<String>,
    /// Minimum price, inclusive.
    pub min_price: Option<Decimal>,
    /// Maximum price, inclusive.
    pub max_price: Option<Decimal>,
}

impl CatalogFilter {
    /// True when no filter is set (the full, unfiltered catalog).
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.category.is_none()
            && self.name.is_none()
            && self.min_price.is_none()
            && self.max_price.is_none()
    }

    /// Query pairs in the API's parameter names, set parameters only.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(category) = &self.category {
            pairs.push(("category", category.clone()));
        }
        if let Some(name) = &self.name {
            pairs.push(("name", name.clone()));
        }
        if let Some(min_price) = &self.min_price {
            pairs.push(("minPrice", min_price.to_string()));
        }
        if let Some(max_price) = &self.max_price {
            pairs.push(("maxPrice", max_price.to_string()));
        }
        pairs
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_deserializes_from_api_json() {
        let json = r#"{"id":1,"name":"Mug","category":"Kitchen","description":"A mug",
                       "price":9.99,"stock":0,"imageUrl":"https://cdn.example.com/mug.jpg"}"#;
        let product: Product = serde_json::from_str(json).unwrap();

        assert_eq!(product.id, ProductId::new(1));
        assert_eq!(product.name, "Mug");
        assert_eq!(product.price, Decimal::new(999, 2));
        assert_eq!(product.stock, 0);
        assert!(!product.in_stock());
        assert_eq!(product.unit_price().display(), "$9.99");
    }

    #[test]
    fn test_product_tolerates_missing_optional_fields() {
        let json = r#"{"id":2,"name":"Bare","price":1.00,"stock":3}"#;
        let product: Product = serde_json::from_str(json).unwrap();

        assert_eq!(product.category, "");
        assert_eq!(product.description, "");
        assert!(product.image_url.is_none());
        assert!(product.in_stock());
    }

    #[test]
    fn test_cart_line_total() {
        let json = r#"{"item":{"id":1,"name":"Mug","price":10,"stock":5},"quantity":2}"#;
        let line: CartLine = serde_json::from_str(json).unwrap();
        assert_eq!(line.line_total().display(), "$20.00");
    }

    #[test]
    fn test_cart_line_input_serializes_camel_case() {
        let input = CartLineInput::new(ProductId::new(7), 3);
        let json = serde_json::to_string(&input).unwrap();
        assert_eq!(json, r#"{"itemId":7,"quantity":3}"#);
    }

    #[test]
    fn test_auth_session_deserializes() {
        let json = r#"{"userId":42,"email":"user@example.com","firstName":"Ada",
                       "lastName":"Lovelace","token":"abc123"}"#;
        let auth: AuthSession = serde_json::from_str(json).unwrap();
        assert_eq!(auth.user_id, UserId::new(42));
        assert_eq!(auth.token, "abc123");
    }

    #[test]
    fn test_filter_query_pairs_price_range_only() {
        let filter = CatalogFilter {
            min_price: Some(Decimal::from(5)),
            max_price: Some(Decimal::from(10)),
            ..CatalogFilter::default()
        };
        assert_eq!(
            filter.query_pairs(),
            vec![
                ("minPrice", "5".to_string()),
                ("maxPrice", "10".to_string())
            ]
        );
    }

    #[test]
    fn test_filter_query_pairs_full() {
        let filter = CatalogFilter {
            category: Some("Kitchen".to_string()),
            name: Some("mug".to_string()),
            min_price: Some(Decimal::new(250, 2)),
            max_price: None,
        };
        assert_eq!(
            filter.query_pairs(),
            vec![
                ("category", "Kitchen".to_string()),
                ("name", "mug".to_string()),
                ("minPrice", "2.50".to_string())
            ]
        );
    }

    #[test]
    fn test_empty_filter() {
        assert!(CatalogFilter::default().is_empty());
        assert!(CatalogFilter::default().query_pairs().is_empty());

        let filtered = CatalogFilter {
            name: Some("mug".to_string()),
            ..CatalogFilter::default()
        };
        assert!(!filtered.is_empty());
    }
}
