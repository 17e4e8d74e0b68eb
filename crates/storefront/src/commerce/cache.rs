//! Cache types for commerce API responses.

use crate::commerce::types::Product;

/// Cache key for catalog data.
///
/// Only unfiltered fetches are cached; filtered queries always go to the API.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum CacheKey {
    /// The full, unfiltered item list.
    Items,
    /// The category list.
    Categories,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Items(Vec<Product>),
    Categories(Vec<String>),
}
