//! Cache types for backend responses.

use nikola_core::catalog::{Category, Product};
use nikola_core::promo::HolidayStatus;

/// Cache key for catalog reads.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Products,
    Product(String),
    Category(String),
    Search(String),
    Categories,
    Holiday,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Products(Vec<Product>),
    Product(Box<Product>),
    Categories(Vec<Category>),
    Holiday(HolidayStatus),
}
