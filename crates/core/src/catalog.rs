//! Product catalog types.
//!
//! Mirrors the backend's product and category documents. The backend is not
//! consistent about a few fields (a product's category may be a single
//! string or a list), so deserialization is lenient and normalizes them.

use serde::{Deserialize, Deserializer, Serialize};

use crate::types::{CategoryId, Price, ProductCode, ProductId};

/// Maximum number of related products shown under a product.
pub const RELATED_PRODUCTS_LIMIT: usize = 6;

/// Category slug meaning "no filter".
pub const ALL_CATEGORIES: &str = "all";

/// A product as returned by `GET /api/products`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ProductId,
    /// Human-readable code (`productId` on the wire).
    #[serde(rename = "productId", default)]
    pub code: ProductCode,
    pub name: String,
    #[serde(default)]
    pub alt_names: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub price: Price,
    /// Price before discount; the product is on sale when this is higher.
    #[serde(default)]
    pub labelled_price: Price,
    #[serde(default)]
    pub stock: i64,
    #[serde(default = "default_available")]
    pub is_available: bool,
    #[serde(default, deserialize_with = "one_or_many")]
    pub category: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub rating_avg: f64,
    #[serde(default)]
    pub rating_count: u32,
}

const fn default_available() -> bool {
    true
}

impl Product {
    /// Whether the labelled price is higher than the selling price.
    #[must_use]
    pub fn on_sale(&self) -> bool {
        self.labelled_price > self.price
    }

    /// Selling price with the holiday discount applied.
    #[must_use]
    pub fn holiday_price(&self, discount_percent: u8) -> Price {
        self.price.percent_off(discount_percent)
    }

    /// Case-insensitive category match. `all` matches every product.
    #[must_use]
    pub fn in_category(&self, slug: &str) -> bool {
        let slug = slug.trim();
        slug.is_empty()
            || slug.eq_ignore_ascii_case(ALL_CATEGORIES)
            || self.category.iter().any(|c| c.eq_ignore_ascii_case(slug))
    }

    /// Average rating rounded to whole stars (0..=5).
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn rating_stars(&self) -> u8 {
        self.rating_avg.round().clamp(0.0, 5.0) as u8
    }

    /// First image, if any.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Whether the product can be added to a cart.
    #[must_use]
    pub const fn purchasable(&self) -> bool {
        self.is_available && self.stock > 0
    }
}

/// Keep only the products in `slug` (see [`Product::in_category`]).
#[must_use]
pub fn filter_by_category(products: Vec<Product>, slug: &str) -> Vec<Product> {
    products
        .into_iter()
        .filter(|p| p.in_category(slug))
        .collect()
}

/// Products related to `current`: candidates sharing a category, minus the
/// product itself, capped at [`RELATED_PRODUCTS_LIMIT`].
#[must_use]
pub fn related_products(candidates: Vec<Product>, current: &Product) -> Vec<Product> {
    candidates
        .into_iter()
        .filter(|p| p.id != current.id)
        .filter(|p| current.category.iter().any(|c| p.in_category(c)))
        .take(RELATED_PRODUCTS_LIMIT)
        .collect()
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: String,
}

impl Category {
    /// Slug, falling back to the lower-cased name when the backend omits it.
    #[must_use]
    pub fn slug_or_name(&self) -> String {
        if self.slug.is_empty() {
            self.name.to_lowercase()
        } else {
            self.slug.clone()
        }
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
        Null(()),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) if s.trim().is_empty() => Vec::new(),
        OneOrMany::One(s) => vec![s],
        OneOrMany::Many(v) => v,
        OneOrMany::Null(()) => Vec::new(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn product(id: &str, categories: &[&str], price: i64) -> Product {
        Product {
            id: ProductId::new(id),
            code: ProductCode::new(format!("NK-{id}")),
            name: format!("Product {id}"),
            alt_names: Vec::new(),
            description: String::new(),
            images: vec![format!("https://img.example/{id}.jpg")],
            price: Price::from_rupees(price),
            labelled_price: Price::from_rupees(price),
            stock: 10,
            is_available: true,
            category: categories.iter().map(|c| (*c).to_owned()).collect(),
            colors: Vec::new(),
            sizes: Vec::new(),
            rating_avg: 0.0,
            rating_count: 0,
        }
    }

    #[test]
    fn test_deserialize_backend_product() {
        let json = r#"{
            "_id": "65a1",
            "productId": "NK-0001",
            "name": "Wool Scarf",
            "altNames": ["Muffler"],
            "images": ["a.jpg"],
            "price": 2500,
            "labelledPrice": 3200,
            "stock": 4,
            "isAvailable": true,
            "category": "accessories"
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.code.as_str(), "NK-0001");
        assert_eq!(product.category, vec!["accessories"]);
        assert!(product.on_sale());
        assert!(product.purchasable());
        assert!(product.colors.is_empty());
    }

    #[test]
    fn test_category_accepts_null_and_list() {
        let json = r#"{"_id": "1", "name": "A", "price": 1, "category": null}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert!(product.category.is_empty());

        let json = r#"{"_id": "1", "name": "A", "price": 1, "category": ["men", "shirts"]}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.category.len(), 2);
    }

    #[test]
    fn test_in_category_is_case_insensitive() {
        let p = product("1", &["Men", "Shirts"], 100);
        assert!(p.in_category("men"));
        assert!(p.in_category("SHIRTS"));
        assert!(p.in_category("all"));
        assert!(!p.in_category("women"));
    }

    #[test]
    fn test_rating_stars() {
        let mut p = product("1", &[], 100);
        p.rating_avg = 4.6;
        assert_eq!(p.rating_stars(), 5);
        p.rating_avg = -1.0;
        assert_eq!(p.rating_stars(), 0);
    }

    #[test]
    fn test_not_on_sale_without_labelled_price() {
        let mut p = product("1", &[], 100);
        p.labelled_price = Price::ZERO;
        assert!(!p.on_sale());
    }

    #[test]
    fn test_holiday_price() {
        let p = product("1", &[], 4000);
        assert_eq!(p.holiday_price(25), Price::from_rupees(3000));
    }

    #[test]
    fn test_filter_by_category() {
        let products = vec![
            product("1", &["men"], 100),
            product("2", &["women"], 100),
            product("3", &["MEN"], 100),
        ];
        let men = filter_by_category(products, "Men");
        assert_eq!(men.len(), 2);
    }

    #[test]
    fn test_related_products_excludes_self_and_caps() {
        let current = product("0", &["men"], 100);
        let mut candidates = vec![current.clone()];
        for i in 1..=10 {
            candidates.push(product(&i.to_string(), &["men"], 100));
        }
        candidates.push(product("x", &["women"], 100));

        let related = related_products(candidates, &current);
        assert_eq!(related.len(), RELATED_PRODUCTS_LIMIT);
        assert!(related.iter().all(|p| p.id != current.id));
        assert!(related.iter().all(|p| p.in_category("men")));
    }

    #[test]
    fn test_category_slug_fallback() {
        let json = r#"{"_id": "c1", "name": "Winter Wear"}"#;
        let category: Category = serde_json::from_str(json).unwrap();
        assert_eq!(category.slug_or_name(), "winter wear");
    }
}
