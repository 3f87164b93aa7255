//! Saved-for-later products.

use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::types::{Price, ProductId};

/// A wishlisted product snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WishlistItem {
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
    pub image: Option<String>,
}

impl From<&Product> for WishlistItem {
    fn from(product: &Product) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
            image: product.primary_image().map(ToOwned::to_owned),
        }
    }
}

/// Outcome of [`Wishlist::toggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggled {
    Added,
    Removed,
}

/// Returned when adding a product that is already saved.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("already in wishlist")]
pub struct AlreadyPresent;

/// The visitor's wishlist.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Wishlist {
    items: Vec<WishlistItem>,
}

impl Wishlist {
    #[must_use]
    pub fn items(&self) -> &[WishlistItem] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: &ProductId) -> bool {
        self.items.iter().any(|i| &i.product_id == id)
    }

    /// Save a product.
    ///
    /// # Errors
    ///
    /// Returns [`AlreadyPresent`] if the product is already saved.
    pub fn add(&mut self, item: WishlistItem) -> Result<(), AlreadyPresent> {
        if self.contains(&item.product_id) {
            return Err(AlreadyPresent);
        }
        self.items.push(item);
        Ok(())
    }

    /// Remove a product. Returns whether anything was removed.
    pub fn remove(&mut self, id: &ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|i| &i.product_id != id);
        self.items.len() != before
    }

    /// Add the product if missing, otherwise remove it.
    pub fn toggle(&mut self, item: WishlistItem) -> Toggled {
        if self.remove(&item.product_id) {
            Toggled::Removed
        } else {
            self.items.push(item);
            Toggled::Added
        }
    }
}
