//! Shopping cart.
//!
//! The cart lives in the visitor's session, not on the backend. Lines are
//! keyed by product, size, and colour: adding the same combination again
//! bumps the quantity instead of adding a new line.

use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::types::{Price, ProductId};

/// Orders with a subtotal above this ship free.
pub const FREE_SHIPPING_THRESHOLD: i64 = 5_000;

/// Flat shipping fee below the free-shipping threshold.
pub const SHIPPING_FEE: i64 = 300;

/// Upper bound for a single line's quantity.
pub const MAX_LINE_QUANTITY: u32 = 99;

/// A single cart line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
    pub quantity: u32,
    pub image: Option<String>,
    pub size: Option<String>,
    pub color: Option<String>,
}

impl CartItem {
    /// Build a line for `product` with the chosen options.
    #[must_use]
    pub fn from_product(
        product: &Product,
        price: Price,
        quantity: u32,
        size: Option<String>,
        color: Option<String>,
    ) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            price,
            quantity: quantity.clamp(1, MAX_LINE_QUANTITY),
            image: product.primary_image().map(ToOwned::to_owned),
            size: size.filter(|s| !s.trim().is_empty()),
            color: color.filter(|c| !c.trim().is_empty()),
        }
    }

    /// `price * quantity`.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }

    fn same_line(&self, other: &Self) -> bool {
        self.product_id == other.product_id && self.size == other.size && self.color == other.color
    }
}

/// Totals shown on the cart and checkout pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartSummary {
    pub subtotal: Price,
    pub shipping: Price,
    pub tax: Price,
    pub total: Price,
}

/// Shipping for a given subtotal: free above [`FREE_SHIPPING_THRESHOLD`].
#[must_use]
pub fn shipping_for(subtotal: Price) -> Price {
    if subtotal > Price::from_rupees(FREE_SHIPPING_THRESHOLD) {
        Price::ZERO
    } else {
        Price::from_rupees(SHIPPING_FEE)
    }
}

/// The visitor's cart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Cart lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add a line, merging with an existing line for the same product,
    /// size, and colour.
    pub fn add(&mut self, item: CartItem) {
        if let Some(existing) = self.items.iter_mut().find(|i| i.same_line(&item)) {
            existing.quantity = (existing.quantity + item.quantity).min(MAX_LINE_QUANTITY);
            existing.price = item.price;
        } else {
            self.items.push(item);
        }
    }

    /// Set the quantity of line `index`. A quantity of zero removes the line.
    ///
    /// Returns `false` when `index` is out of range.
    pub fn set_quantity(&mut self, index: usize, quantity: u32) -> bool {
        if quantity == 0 {
            return self.remove(index).is_some();
        }
        match self.items.get_mut(index) {
            Some(item) => {
                item.quantity = quantity.min(MAX_LINE_QUANTITY);
                true
            }
            None => false,
        }
    }

    /// Remove line `index`, returning it.
    pub fn remove(&mut self, index: usize) -> Option<CartItem> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Total number of units (shown on the header badge).
    #[must_use]
    pub fn count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Subtotal, shipping, tax and total.
    #[must_use]
    pub fn summary(&self) -> CartSummary {
        let subtotal = self.subtotal();
        let shipping = shipping_for(subtotal);
        let tax = Price::ZERO;
        CartSummary {
            subtotal,
            shipping,
            tax,
            total: subtotal + shipping + tax,
        }
    }
}
